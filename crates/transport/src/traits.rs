/// Where a serialized envelope goes next.
///
/// Delivery is pass/fail: transport problems are logged by the implementation
/// and reported as `false`, never as an error.
pub trait NextHop: Send + Sync {
    fn deliver(&self, payload: &[u8]) -> bool;

    /// Human-readable destination, used in logs.
    fn describe(&self) -> String;
}

impl<T: NextHop + ?Sized> NextHop for Box<T> {
    fn deliver(&self, payload: &[u8]) -> bool {
        (**self).deliver(payload)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
