//! The range collector, the policy-driven walk over a container's substructures.
//!
//! Collection decides which byte ranges of a [`DexFile`] should change
//! accessibility and parks those decisions in a [`RangeQueue`] without touching
//! any shadow memory itself. [`collect_ranges`] is the policy dispatch entry
//! point; [`RangeCollector`] exposes the individual marking passes for callers
//! composing their own scheme under [`TrackingPolicy::Custom`].
//!
//! The traversal is fixed: class definitions in index order, and within each
//! class the direct methods of its class data in declaration order. Classes
//! without class data and methods without code contribute nothing, and fields
//! are never visited. Enqueue order is application order, which is what lets a
//! later entry for the same bytes override an earlier one.

use tracing::debug;

use crate::{
    dex::{CodeItem, DexFile, EncodedMethod},
    tracking::{
        policy::{TrackingConfig, TrackingPolicy},
        range::{RangeEntry, RangeQueue},
    },
    Result,
};

/// Collect the pending ranges for one container under `config`.
///
/// Emits a single diagnostic debug event naming the container's location and
/// base address, then dispatches on the configured policy. With tracking
/// disabled this returns an empty queue and stays completely silent.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the exemption pass of
/// [`TrackingPolicy::CodeItemsExceptInsnsNoClinit`] hits an unresolvable
/// method name.
///
/// # Examples
///
/// ```rust,no_run
/// use dexshadow::{collect_ranges, DexFile, TrackingConfig};
///
/// let dex = DexFile::from_file("classes.dex")?;
/// let queue = collect_ranges(&dex, &TrackingConfig::code_items())?;
/// println!("{} pending ranges", queue.len());
/// # Ok::<(), dexshadow::Error>(())
/// ```
pub fn collect_ranges(dex: &DexFile, config: &TrackingConfig) -> Result<RangeQueue> {
    if !config.enabled {
        return Ok(RangeQueue::new());
    }

    debug!("tracking dex file {} @ {:#x}", dex.location(), dex.base());

    let mut collector = RangeCollector::new(dex);
    match config.policy {
        TrackingPolicy::WholeFile => collector.mark_whole_file(true),
        TrackingPolicy::CodeItems => collector.mark_all_code_items(true),
        TrackingPolicy::CodeItemsExceptInsns => collector.mark_all_code_items_except_insns(),
        TrackingPolicy::CodeItemsExceptInsnsNoClinit => {
            collector.mark_all_code_items_except_insns();
            collector.mark_named_method(&config.exempt_method, false)?;
        }
        TrackingPolicy::Custom => {}
    }

    Ok(collector.into_queue())
}

/// Walks one container and accumulates pending range entries.
///
/// Each `mark_*` pass appends entries for one kind of substructure; passes can
/// be chained in any order, and entries enqueued later win over earlier ones for
/// the same bytes once the queue is applied.
pub struct RangeCollector<'a> {
    dex: &'a DexFile,
    queue: RangeQueue,
}

impl<'a> RangeCollector<'a> {
    /// Create a collector for `dex` with an empty queue.
    #[must_use]
    pub fn new(dex: &'a DexFile) -> Self {
        RangeCollector {
            dex,
            queue: RangeQueue::new(),
        }
    }

    /// Enqueue one entry covering the entire container, `[base, base + size)`.
    pub fn mark_whole_file(&mut self, should_poison: bool) {
        self.queue.push(RangeEntry {
            address: self.dex.base(),
            len: self.dex.size(),
            should_poison,
        });
    }

    /// Enqueue one entry per code item, covering the item's full byte extent.
    pub fn mark_all_code_items(&mut self, should_poison: bool) {
        let base = self.dex.base();
        for (_, code) in methods_with_code(self.dex) {
            self.queue.push(RangeEntry {
                address: base + u64::from(code.offset),
                len: code.size,
                should_poison,
            });
        }
    }

    /// Enqueue one entry per code item, covering only its instruction array.
    ///
    /// The range length is exactly two bytes per 16-bit code unit; the
    /// surrounding code-item header and exception tables are not included.
    pub fn mark_all_insns(&mut self, should_poison: bool) {
        let base = self.dex.base();
        for (_, code) in methods_with_code(self.dex) {
            self.queue.push(RangeEntry {
                address: base + u64::from(code.insns_offset()),
                len: code.insns_byte_len(),
                should_poison,
            });
        }
    }

    /// Enqueue two entries per code item: the whole item poisoned, then its
    /// instruction array marked defined again.
    pub fn mark_all_code_items_except_insns(&mut self) {
        let base = self.dex.base();
        for (_, code) in methods_with_code(self.dex) {
            self.queue.push(RangeEntry::poison(
                base + u64::from(code.offset),
                code.size,
            ));
            self.queue.push(RangeEntry::unpoison(
                base + u64::from(code.insns_offset()),
                code.insns_byte_len(),
            ));
        }
    }

    /// Enqueue one whole-item entry for every method whose name equals `name`.
    ///
    /// Matching is by method name only, never by owning class, so same-named
    /// methods across classes (every class initializer, for instance) all
    /// receive an entry, in traversal order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a method's name cannot be
    /// resolved through the identifier tables.
    pub fn mark_named_method(&mut self, name: &str, should_poison: bool) -> Result<()> {
        let base = self.dex.base();
        for (method, code) in methods_with_code(self.dex) {
            if self.dex.method_name(method.method_idx)? == name {
                self.queue.push(RangeEntry {
                    address: base + u64::from(code.offset),
                    len: code.size,
                    should_poison,
                });
            }
        }

        Ok(())
    }

    /// Enqueue a caller-built entry.
    pub fn push(&mut self, entry: RangeEntry) {
        self.queue.push(entry);
    }

    /// Consume the collector, yielding the accumulated queue.
    #[must_use]
    pub fn into_queue(self) -> RangeQueue {
        self.queue
    }
}

/// Direct methods with code across every class with class data, in traversal order
fn methods_with_code(dex: &DexFile) -> impl Iterator<Item = (&EncodedMethod, &CodeItem)> {
    dex.class_defs()
        .iter()
        .filter_map(|class| class.class_data.as_ref())
        .flat_map(|class_data| class_data.direct_methods.iter())
        .filter_map(|method| method.code.as_ref().map(|code| (method, code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{clinit_pair_dex, empty_class_dex, two_code_items_dex};
    use strum::IntoEnumIterator;

    fn entries(queue: &RangeQueue) -> Vec<RangeEntry> {
        queue.iter().copied().collect()
    }

    #[test]
    fn test_whole_file_policy() {
        let dex = empty_class_dex();
        let queue = collect_ranges(&dex, &TrackingConfig::whole_file()).unwrap();

        assert_eq!(
            entries(&queue),
            vec![RangeEntry::poison(dex.base(), dex.size())]
        );
    }

    #[test]
    fn test_code_items_policy_without_code() {
        let dex = empty_class_dex();
        let queue = collect_ranges(&dex, &TrackingConfig::code_items()).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_code_items_policy() {
        let dex = two_code_items_dex();
        let queue = collect_ranges(&dex, &TrackingConfig::code_items()).unwrap();

        let code: Vec<_> = crate::test::methods_with_code(&dex)
            .into_iter()
            .map(|(_, code)| code)
            .collect();
        assert_eq!(code.len(), 2);

        assert_eq!(
            entries(&queue),
            vec![
                RangeEntry::poison(dex.base() + u64::from(code[0].offset), code[0].size),
                RangeEntry::poison(dex.base() + u64::from(code[1].offset), code[1].size),
            ]
        );
    }

    #[test]
    fn test_code_items_except_insns_interleaves() {
        let dex = two_code_items_dex();
        let queue = collect_ranges(&dex, &TrackingConfig::code_items_except_insns()).unwrap();

        let code: Vec<_> = crate::test::methods_with_code(&dex)
            .into_iter()
            .map(|(_, code)| code)
            .collect();
        let base = dex.base();

        // 10 and 20 code units: items span 36 and 56 bytes, insns 20 and 40
        assert_eq!(
            entries(&queue),
            vec![
                RangeEntry::poison(base + u64::from(code[0].offset), 36),
                RangeEntry::unpoison(base + u64::from(code[0].insns_offset()), 20),
                RangeEntry::poison(base + u64::from(code[1].offset), 56),
                RangeEntry::unpoison(base + u64::from(code[1].insns_offset()), 40),
            ]
        );
    }

    #[test]
    fn test_clinit_exemption_appended_last() {
        let dex = clinit_pair_dex();
        let config = TrackingConfig::code_items_except_insns_no_clinit();
        let queue = collect_ranges(&dex, &config).unwrap();

        // 3 direct code items interleave into 6 entries, then one exemption
        // per <clinit> across both classes
        let all = entries(&queue);
        assert_eq!(all.len(), 8);

        let clinit_blocks: Vec<RangeEntry> = crate::test::methods_with_code(&dex)
            .into_iter()
            .filter(|(method, _)| dex.method_name(method.method_idx).unwrap() == "<clinit>")
            .map(|(_, code)| {
                RangeEntry::unpoison(dex.base() + u64::from(code.offset), code.size)
            })
            .collect();
        assert_eq!(clinit_blocks.len(), 2);
        assert_eq!(&all[6..], &clinit_blocks[..]);
    }

    #[test]
    fn test_custom_exempt_method_name() {
        let dex = clinit_pair_dex();
        let config =
            TrackingConfig::code_items_except_insns_no_clinit().with_exempt_method("compute");
        let queue = collect_ranges(&dex, &config).unwrap();

        let all = entries(&queue);
        assert_eq!(all.len(), 7);
        let exemption = all.last().unwrap();
        assert!(!exemption.should_poison);

        let (_, compute_code) = crate::test::methods_with_code(&dex)
            .into_iter()
            .find(|(method, _)| dex.method_name(method.method_idx).unwrap() == "compute")
            .unwrap();
        assert_eq!(exemption.address, dex.base() + u64::from(compute_code.offset));
        assert_eq!(exemption.len, compute_code.size);
    }

    #[test]
    fn test_exemption_without_match() {
        let dex = clinit_pair_dex();
        let config =
            TrackingConfig::code_items_except_insns_no_clinit().with_exempt_method("missing");
        let queue = collect_ranges(&dex, &config).unwrap();

        // No name matches, so the queue matches the plain except-insns policy
        let baseline =
            collect_ranges(&dex, &TrackingConfig::code_items_except_insns()).unwrap();
        assert_eq!(entries(&queue), entries(&baseline));
    }

    #[test]
    fn test_disabled_config_collects_nothing() {
        let dex = clinit_pair_dex();
        for policy in TrackingPolicy::iter() {
            let config = TrackingConfig {
                enabled: false,
                policy,
                exempt_method: "<clinit>".to_string(),
            };
            let queue = collect_ranges(&dex, &config).unwrap();
            assert!(queue.is_empty(), "policy {policy} enqueued ranges while disabled");
        }
    }

    #[test]
    fn test_custom_policy_enqueues_nothing() {
        let dex = two_code_items_dex();
        let queue = collect_ranges(&dex, &TrackingConfig::custom()).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_collector_composition() {
        // A custom scheme: seal the whole container, re-open instruction arrays
        let dex = two_code_items_dex();

        let mut collector = RangeCollector::new(&dex);
        collector.mark_whole_file(true);
        collector.mark_all_insns(false);
        let queue = collector.into_queue();

        let all = entries(&queue);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], RangeEntry::poison(dex.base(), dex.size()));
        assert!(!all[1].should_poison);
        assert!(!all[2].should_poison);
    }

    #[test]
    fn test_virtual_methods_not_tracked() {
        let dex = clinit_pair_dex();

        // The container parses a virtual method with code, but no pass visits it
        let has_virtual_code = dex
            .class_defs()
            .iter()
            .filter_map(|class| class.class_data.as_ref())
            .flat_map(|data| data.virtual_methods.iter())
            .any(|method| method.code.is_some());
        assert!(has_virtual_code);

        let virtual_offsets: Vec<u64> = dex
            .class_defs()
            .iter()
            .filter_map(|class| class.class_data.as_ref())
            .flat_map(|data| data.virtual_methods.iter())
            .filter_map(|method| method.code.as_ref())
            .map(|code| dex.base() + u64::from(code.offset))
            .collect();

        let queue = collect_ranges(&dex, &TrackingConfig::code_items()).unwrap();
        assert_eq!(queue.len(), 3);
        assert!(queue
            .iter()
            .all(|entry| !virtual_offsets.contains(&entry.address)));
    }
}
