//! Instruction statistics categories.
//!
//! Each opcode maps to at most one [`InstructionCategory`]. Opcodes that are
//! structural (types, decorations, debug info, memory access) have no
//! category and are not counted.

use spirv::Op;

/// Counted instruction families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionCategory {
    Arithmetic,
    Bit,
    Logical,
    Texture,
    Derivative,
    ControlFlow,
}

/// Per-category instruction counts accumulated over one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionCounts {
    pub arithmetic: u32,
    pub bit: u32,
    pub logical: u32,
    pub texture: u32,
    pub derivative: u32,
    pub control_flow: u32,
}

impl InstructionCounts {
    #[inline]
    pub fn record(&mut self, category: InstructionCategory) {
        let slot = match category {
            InstructionCategory::Arithmetic => &mut self.arithmetic,
            InstructionCategory::Bit => &mut self.bit,
            InstructionCategory::Logical => &mut self.logical,
            InstructionCategory::Texture => &mut self.texture,
            InstructionCategory::Derivative => &mut self.derivative,
            InstructionCategory::ControlFlow => &mut self.control_flow,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, category: InstructionCategory) -> u32 {
        match category {
            InstructionCategory::Arithmetic => self.arithmetic,
            InstructionCategory::Bit => self.bit,
            InstructionCategory::Logical => self.logical,
            InstructionCategory::Texture => self.texture,
            InstructionCategory::Derivative => self.derivative,
            InstructionCategory::ControlFlow => self.control_flow,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.arithmetic)
            + u64::from(self.bit)
            + u64::from(self.logical)
            + u64::from(self.texture)
            + u64::from(self.derivative)
            + u64::from(self.control_flow)
    }
}

/// Classifies a core opcode.
///
/// `OpExtInst` is classified by the parser, which knows the imported set.
#[must_use]
pub fn classify(op: Op) -> Option<InstructionCategory> {
    use InstructionCategory as C;

    let category = match op {
        Op::SNegate
        | Op::FNegate
        | Op::IAdd
        | Op::FAdd
        | Op::ISub
        | Op::FSub
        | Op::IMul
        | Op::FMul
        | Op::UDiv
        | Op::SDiv
        | Op::FDiv
        | Op::UMod
        | Op::SRem
        | Op::SMod
        | Op::FRem
        | Op::FMod
        | Op::VectorTimesScalar
        | Op::MatrixTimesScalar
        | Op::VectorTimesMatrix
        | Op::MatrixTimesVector
        | Op::MatrixTimesMatrix
        | Op::OuterProduct
        | Op::Dot
        | Op::IAddCarry
        | Op::ISubBorrow
        | Op::UMulExtended
        | Op::SMulExtended
        | Op::Transpose => C::Arithmetic,

        Op::ShiftRightLogical
        | Op::ShiftRightArithmetic
        | Op::ShiftLeftLogical
        | Op::BitwiseOr
        | Op::BitwiseXor
        | Op::BitwiseAnd
        | Op::Not
        | Op::BitFieldInsert
        | Op::BitFieldSExtract
        | Op::BitFieldUExtract
        | Op::BitReverse
        | Op::BitCount => C::Bit,

        Op::Any
        | Op::All
        | Op::IsNan
        | Op::IsInf
        | Op::IsFinite
        | Op::IsNormal
        | Op::SignBitSet
        | Op::LessOrGreater
        | Op::Ordered
        | Op::Unordered
        | Op::LogicalEqual
        | Op::LogicalNotEqual
        | Op::LogicalOr
        | Op::LogicalAnd
        | Op::LogicalNot
        | Op::Select
        | Op::IEqual
        | Op::INotEqual
        | Op::UGreaterThan
        | Op::SGreaterThan
        | Op::UGreaterThanEqual
        | Op::SGreaterThanEqual
        | Op::ULessThan
        | Op::SLessThan
        | Op::ULessThanEqual
        | Op::SLessThanEqual
        | Op::FOrdEqual
        | Op::FUnordEqual
        | Op::FOrdNotEqual
        | Op::FUnordNotEqual
        | Op::FOrdLessThan
        | Op::FUnordLessThan
        | Op::FOrdGreaterThan
        | Op::FUnordGreaterThan
        | Op::FOrdLessThanEqual
        | Op::FUnordLessThanEqual
        | Op::FOrdGreaterThanEqual
        | Op::FUnordGreaterThanEqual => C::Logical,

        Op::ImageSampleImplicitLod
        | Op::ImageSampleExplicitLod
        | Op::ImageSampleDrefImplicitLod
        | Op::ImageSampleDrefExplicitLod
        | Op::ImageSampleProjImplicitLod
        | Op::ImageSampleProjExplicitLod
        | Op::ImageSampleProjDrefImplicitLod
        | Op::ImageSampleProjDrefExplicitLod
        | Op::ImageFetch
        | Op::ImageGather
        | Op::ImageDrefGather
        | Op::ImageRead
        | Op::ImageWrite
        | Op::ImageQueryFormat
        | Op::ImageQueryOrder
        | Op::ImageQuerySizeLod
        | Op::ImageQuerySize
        | Op::ImageQueryLod
        | Op::ImageQueryLevels
        | Op::ImageQuerySamples => C::Texture,

        Op::DPdx
        | Op::DPdy
        | Op::Fwidth
        | Op::DPdxFine
        | Op::DPdyFine
        | Op::FwidthFine
        | Op::DPdxCoarse
        | Op::DPdyCoarse
        | Op::FwidthCoarse => C::Derivative,

        Op::Phi
        | Op::LoopMerge
        | Op::SelectionMerge
        | Op::Branch
        | Op::BranchConditional
        | Op::Switch
        | Op::Kill
        | Op::Return
        | Op::ReturnValue
        | Op::Unreachable
        | Op::FunctionCall
        | Op::TerminateInvocation => C::ControlFlow,

        _ => return None,
    };

    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_examples() {
        assert_eq!(classify(Op::FAdd), Some(InstructionCategory::Arithmetic));
        assert_eq!(classify(Op::BitwiseAnd), Some(InstructionCategory::Bit));
        assert_eq!(classify(Op::FOrdLessThan), Some(InstructionCategory::Logical));
        assert_eq!(
            classify(Op::ImageSampleImplicitLod),
            Some(InstructionCategory::Texture)
        );
        assert_eq!(classify(Op::DPdx), Some(InstructionCategory::Derivative));
        assert_eq!(classify(Op::BranchConditional), Some(InstructionCategory::ControlFlow));
        assert_eq!(classify(Op::Load), None);
        assert_eq!(classify(Op::TypeFloat), None);
    }

    #[test]
    fn test_counts_record_and_total() {
        let mut counts = InstructionCounts::default();
        counts.record(InstructionCategory::Arithmetic);
        counts.record(InstructionCategory::Arithmetic);
        counts.record(InstructionCategory::Texture);
        assert_eq!(counts.get(InstructionCategory::Arithmetic), 2);
        assert_eq!(counts.total(), 3);
    }
}
