//! The memory tool abstraction that poisoning passes drive.

/// A byte-granular access control backend.
///
/// Implementations mark address ranges of the current process as off-limits or
/// readable again. The tracking passes never interpret addresses themselves, they
/// only forward the ranges they collected, so the same pass logic drives a real
/// sanitizer runtime and the bookkeeping [`crate::ShadowMemory`] alike.
///
/// # Contract
///
/// - Both operations are infallible. A backend that cannot honor a request must
///   handle that internally rather than surface it here.
/// - A `len` of zero is a no-op for both operations.
/// - Operations apply at byte granularity and later calls win: marking a range
///   no-access and then marking a sub-range defined leaves only the remainder
///   inaccessible.
pub trait MemoryTool {
    /// Mark `len` bytes starting at `address` as inaccessible.
    fn mark_no_access(&mut self, address: u64, len: usize);

    /// Mark `len` bytes starting at `address` as readable and writable.
    fn mark_defined(&mut self, address: u64, len: usize);
}

impl<T: MemoryTool + ?Sized> MemoryTool for &mut T {
    fn mark_no_access(&mut self, address: u64, len: usize) {
        (**self).mark_no_access(address, len);
    }

    fn mark_defined(&mut self, address: u64, len: usize) {
        (**self).mark_defined(address, len);
    }
}
