//! Registration, the collect-then-apply pair embedders call.
//!
//! One registration processes one container: the collector builds the pending
//! queue under the configured policy, then the applicator flushes it into the
//! memory tool. An absent container and a disabled configuration are both legal
//! silent no-ops, not errors; a runtime can hand over whatever its loader
//! produced without checking first.

use crate::{
    dex::DexFile,
    shadow::MemoryTool,
    tracking::{applicator::apply_ranges, collector::collect_ranges, policy::TrackingConfig},
    Result,
};

/// Run one collect-then-apply cycle for `dex` against `tool`.
///
/// `None` performs nothing and emits nothing. The queue lives entirely inside
/// this call: collected, fully drained, discarded.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the exemption pass cannot resolve a
/// method name.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{register_dex_file, DexFile, ShadowMemory, TrackingConfig};
///
/// let dex = DexFile::from_file("classes.dex")?;
/// let mut shadow = ShadowMemory::new();
///
/// register_dex_file(Some(&dex), &TrackingConfig::code_items(), &mut shadow)?;
/// println!("{:#x} bytes poisoned", shadow.poisoned_len());
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub fn register_dex_file<T: MemoryTool + ?Sized>(
    dex: Option<&DexFile>,
    config: &TrackingConfig,
    tool: &mut T,
) -> Result<()> {
    let Some(dex) = dex else {
        return Ok(());
    };

    let mut queue = collect_ranges(dex, config)?;
    apply_ranges(&mut queue, tool);
    Ok(())
}

/// A configuration and memory tool bundled for repeated registrations.
///
/// Containers are processed strictly one at a time; each [`TrackingRegistrar::register`]
/// call runs a complete, independent collect-then-apply cycle against the owned tool.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{DexFile, ShadowMemory, TrackingConfig, TrackingRegistrar};
///
/// let mut registrar = TrackingRegistrar::new(
///     TrackingConfig::code_items_except_insns(),
///     ShadowMemory::new(),
/// );
///
/// let dex = DexFile::from_file("classes.dex")?;
/// registrar.register(Some(&dex))?;
/// registrar.register(None)?; // Legal, does nothing
///
/// let shadow = registrar.into_tool();
/// println!("{} ranges poisoned", shadow.poisoned_ranges().count());
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub struct TrackingRegistrar<T: MemoryTool> {
    config: TrackingConfig,
    tool: T,
}

impl<T: MemoryTool> TrackingRegistrar<T> {
    /// Create a registrar from a configuration and the memory tool it drives.
    pub fn new(config: TrackingConfig, tool: T) -> Self {
        TrackingRegistrar { config, tool }
    }

    /// Run one collect-then-apply cycle for `dex`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the exemption pass cannot resolve
    /// a method name.
    pub fn register(&mut self, dex: Option<&DexFile>) -> Result<()> {
        register_dex_file(dex, &self.config, &mut self.tool)
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Borrow the memory tool, for inspecting accumulated state.
    #[must_use]
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Mutably borrow the memory tool.
    pub fn tool_mut(&mut self) -> &mut T {
        &mut self.tool
    }

    /// Consume the registrar, yielding the memory tool.
    #[must_use]
    pub fn into_tool(self) -> T {
        self.tool
    }
}
