use crate::{
    builder::{ClassBuilder, DexBuilder, MethodBuilder},
    dex::{CodeItem, DexFile, EncodedMethod},
    shadow::MemoryTool,
};

// A container holding a single memberless class and no code items
pub fn empty_class_dex() -> DexFile {
    let image = DexBuilder::new()
        .class(ClassBuilder::new("LEmpty;"))
        .build()
        .unwrap();
    DexFile::from_mem(image, "empty_class.dex").unwrap()
}

// Two classes with one direct code item each, 10 and 20 code units in
// traversal order. The class data between the items keeps their byte
// ranges from touching.
pub fn two_code_items_dex() -> DexFile {
    let image = DexBuilder::new()
        .class(ClassBuilder::new("LFirst;").direct_method(MethodBuilder::new("main").insns(10)))
        .class(ClassBuilder::new("LSecond;").direct_method(MethodBuilder::new("run").insns(20)))
        .build()
        .unwrap();
    DexFile::from_mem(image, "two_code_items.dex").unwrap()
}

// Two classes that both declare a <clinit>, yielding three direct code
// items in traversal order: LAlpha.<clinit>, LAlpha.compute (with an
// exception table), LBeta.<clinit>. Adds a bodyless native method and a
// virtual method with code, which no marking pass may visit.
pub fn clinit_pair_dex() -> DexFile {
    let image = DexBuilder::new()
        .class(
            ClassBuilder::new("LAlpha;")
                .direct_method(MethodBuilder::new("<clinit>").insns(6))
                .direct_method(MethodBuilder::new("compute").insns(12).with_try_handler())
                .direct_method(MethodBuilder::new("launch")),
        )
        .class(
            ClassBuilder::new("LBeta;")
                .direct_method(MethodBuilder::new("<clinit>").insns(4))
                .virtual_method(MethodBuilder::new("render").insns(8)),
        )
        .build()
        .unwrap();
    DexFile::from_mem(image, "clinit_pair.dex").unwrap()
}

// Direct methods with code in traversal order, the way the marking passes
// walk them
pub fn methods_with_code(dex: &DexFile) -> Vec<(&EncodedMethod, &CodeItem)> {
    dex.class_defs()
        .iter()
        .filter_map(|class| class.class_data.as_ref())
        .flat_map(|class_data| class_data.direct_methods.iter())
        .filter_map(|method| method.code.as_ref().map(|code| (method, code)))
        .collect()
}

/// One recorded [`MemoryTool`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEvent {
    NoAccess { address: u64, len: usize },
    Defined { address: u64, len: usize },
}

impl ToolEvent {
    pub fn no_access(address: u64, len: usize) -> Self {
        ToolEvent::NoAccess { address, len }
    }

    pub fn defined(address: u64, len: usize) -> Self {
        ToolEvent::Defined { address, len }
    }
}

/// Memory tool that records every call instead of protecting anything,
/// preserving call order and direction.
#[derive(Debug, Default)]
pub struct RecordingTool {
    pub events: Vec<ToolEvent>,
}

impl MemoryTool for RecordingTool {
    fn mark_no_access(&mut self, address: u64, len: usize) {
        self.events.push(ToolEvent::no_access(address, len));
    }

    fn mark_defined(&mut self, address: u64, len: usize) {
        self.events.push(ToolEvent::defined(address, len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_class_dex_has_no_code() {
        let dex = empty_class_dex();
        assert_eq!(dex.class_defs().len(), 1);
        assert!(methods_with_code(&dex).is_empty());
    }

    #[test]
    fn test_two_code_items_shapes() {
        let dex = two_code_items_dex();
        let code: Vec<_> = methods_with_code(&dex);
        assert_eq!(code.len(), 2);

        assert_eq!(code[0].1.insns_size, 10);
        assert_eq!(code[0].1.size, 36);
        assert_eq!(code[1].1.insns_size, 20);
        assert_eq!(code[1].1.size, 56);

        // Disjoint items, so range marks on them never merge
        let first_end = code[0].1.offset + code[0].1.size as u32;
        assert!(first_end < code[1].1.offset);
    }

    #[test]
    fn test_clinit_pair_traversal_order() {
        let dex = clinit_pair_dex();
        let names: Vec<String> = methods_with_code(&dex)
            .into_iter()
            .map(|(method, _)| dex.method_name(method.method_idx).unwrap())
            .collect();
        assert_eq!(names, vec!["<clinit>", "compute", "<clinit>"]);
    }

    #[test]
    fn test_clinit_pair_compute_has_tries() {
        let dex = clinit_pair_dex();
        let (_, code) = methods_with_code(&dex)
            .into_iter()
            .find(|(method, _)| dex.method_name(method.method_idx).unwrap() == "compute")
            .unwrap();

        // The exception table extends the item past its instruction array
        assert_eq!(code.tries_size, 1);
        assert!(code.size > 16 + code.insns_byte_len());
    }

    #[test]
    fn test_recording_tool_keeps_order() {
        let mut tool = RecordingTool::default();
        tool.mark_no_access(0x100, 0x10);
        tool.mark_defined(0x104, 0x4);

        assert_eq!(
            tool.events,
            vec![ToolEvent::no_access(0x100, 0x10), ToolEvent::defined(0x104, 0x4)]
        );
    }
}
