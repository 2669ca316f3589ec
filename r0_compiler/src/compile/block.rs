//! Basic blocks and jump resolution.
use std::collections::HashMap;

use r0_bytecode::Instr;

/// Identity of a basic block, stable across moves of the block list.
///
/// A `while` produces a back-edge and an `if` branches forward to
/// blocks laid out later, so targets are ids resolved to instruction
/// offsets only after the whole function is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// A straight-line instruction sequence ending in at most one branch.
#[derive(Debug)]
pub struct BasicBlock {
    pub id: BlockId,
    pub instructions: Vec<Instr>,
    /// When set, the block's final instruction is a branch whose
    /// immediate is patched with the target's offset after layout.
    pub branch: Option<BlockId>,
    /// Instruction index of this block's first instruction within its
    /// function. Assigned during layout.
    pub offset: u32,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            instructions: vec![],
            branch: None,
            offset: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, instr: Instr) {
        self.instructions.push(instr);
    }

    pub fn ends_with_ret(&self) -> bool {
        matches!(self.instructions.last(), Some(Instr::Ret))
    }
}

/// Lay out the blocks in order, patch branch immediates, and flatten
/// into the function's instruction stream.
///
/// A branch at instruction index `p` targeting a block starting at
/// index `q` carries the immediate `q - p - 1`: the VM's program
/// counter has already advanced past the branch when the offset is
/// applied.
pub fn resolve_jumps(mut blocks: Vec<BasicBlock>) -> Vec<Instr> {
    let mut count = 0u32;
    for block in &mut blocks {
        block.offset = count;
        count += block.instructions.len() as u32;
    }

    let offsets: HashMap<BlockId, u32> =
        blocks.iter().map(|block| (block.id, block.offset)).collect();

    for block in &mut blocks {
        let target = match block.branch {
            Some(target) => target,
            None => continue,
        };
        let target_offset = *offsets
            .get(&target)
            .expect("branch target block is not part of the function");

        let branch_pos = block.offset + block.instructions.len() as u32 - 1;
        let immediate = target_offset as i64 - branch_pos as i64 - 1;

        match block.instructions.last_mut() {
            Some(Instr::Br(imm)) | Some(Instr::BrFalse(imm)) => *imm = immediate as i32,
            _ => unreachable!("branch target set on a block that does not end in a branch"),
        }
    }

    blocks
        .into_iter()
        .flat_map(|block| block.instructions)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_forward_and_backward_patching() {
        // cond:  [.., br.false ->after]   offsets 0..=1
        // body:  [.., br ->cond]          offsets 2..=3
        // after: [ret]                    offset  4
        let mut cond = BasicBlock::new(BlockId(0));
        cond.push(Instr::Push(1));
        cond.push(Instr::BrFalse(0));
        cond.branch = Some(BlockId(2));

        let mut body = BasicBlock::new(BlockId(1));
        body.push(Instr::Push(2));
        body.push(Instr::Br(0));
        body.branch = Some(BlockId(0));

        let mut after = BasicBlock::new(BlockId(2));
        after.push(Instr::Ret);

        let instructions = resolve_jumps(vec![cond, body, after]);
        assert_eq!(instructions[1], Instr::BrFalse(2)); // 4 - 1 - 1
        assert_eq!(instructions[3], Instr::Br(-4)); // 0 - 3 - 1
        assert_eq!(instructions.len(), 5);
    }

    #[test]
    fn test_empty_blocks_take_no_space() {
        let first = BasicBlock::new(BlockId(0));
        let mut second = BasicBlock::new(BlockId(1));
        second.push(Instr::Ret);

        let instructions = resolve_jumps(vec![first, second]);
        assert_eq!(instructions, vec![Instr::Ret]);
    }
}
