//! Hand-assembled SPIR-V fixtures.

#![allow(dead_code)]

use spirv::Op;

/// Packs a literal string as nul-terminated little-endian words.
pub fn string_words(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Minimal SPIR-V word encoder.
pub struct ModuleBuilder {
    words: Vec<u32>,
    instructions: u32,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            // magic, version 1.3, generator, bound, schema
            words: vec![spirv::MAGIC_NUMBER, 0x0001_0300, 0, 256, 0],
            instructions: 0,
        }
    }

    pub fn op(&mut self, op: Op, operands: &[u32]) -> &mut Self {
        let word_count = (operands.len() + 1) as u32;
        self.words.push((word_count << 16) | op as u32);
        self.words.extend_from_slice(operands);
        self.instructions += 1;
        self
    }

    /// An instruction whose operands are `before`, a literal string, then
    /// `after`.
    pub fn op_str(&mut self, op: Op, before: &[u32], s: &str, after: &[u32]) -> &mut Self {
        let mut operands = before.to_vec();
        operands.extend(string_words(s));
        operands.extend_from_slice(after);
        self.op(op, &operands)
    }

    pub fn instruction_count(&self) -> u32 {
        self.instructions
    }

    pub fn finish(&self) -> Vec<u32> {
        self.words.clone()
    }
}

// Ids used by `compute_module`.
pub const GLSL_STD: u32 = 1;
pub const FILE: u32 = 2;
pub const VOID: u32 = 3;
pub const FLOAT: u32 = 4;
pub const VEC3: u32 = 5;
pub const INT: u32 = 6;
pub const FN_VOID: u32 = 7;
pub const FN_FLOAT: u32 = 8;
pub const PTR_FN_FLOAT: u32 = 9;
pub const MAIN: u32 = 10;
pub const HELPER: u32 = 20;
pub const LIGHT: u32 = 30;
pub const PTR_UNIFORM_LIGHT: u32 = 31;
pub const PTR_PRIVATE_INT: u32 = 32;
pub const LIGHTS: u32 = 40;
pub const COUNTER: u32 = 41;
pub const TWO: u32 = 50;

/// A compute module with:
/// - local size 8x4x1 and a workgroup barrier
/// - struct `Light { vec3 color; float intensity; }` bound as uniform `lights`
/// - private global `counter`
/// - `helper(f1;` on lines 5..=8 with one argument and one local
/// - `main(` on lines 12..=15
/// - 3 arithmetic, 1 bit and 2 control-flow instructions
pub fn compute_module(with_lines: bool) -> (Vec<u32>, u32) {
    let mut m = ModuleBuilder::new();

    m.op(Op::Capability, &[1]);
    m.op_str(Op::ExtInstImport, &[GLSL_STD], "GLSL.std.450", &[]);
    m.op(Op::MemoryModel, &[0, 1]);
    m.op_str(Op::EntryPoint, &[5, MAIN], "main", &[]);
    m.op(Op::ExecutionMode, &[MAIN, 17, 8, 4, 1]);
    m.op_str(Op::String, &[FILE], "shader.comp", &[]);
    m.op_str(Op::Name, &[MAIN], "main(", &[]);
    m.op_str(Op::Name, &[HELPER], "helper(f1;", &[]);
    m.op_str(Op::Name, &[LIGHT], "Light", &[]);
    m.op_str(Op::MemberName, &[LIGHT, 0], "color", &[]);
    m.op_str(Op::MemberName, &[LIGHT, 1], "intensity", &[]);
    m.op_str(Op::Name, &[LIGHTS], "lights", &[]);
    m.op_str(Op::Name, &[COUNTER], "counter", &[]);
    m.op_str(Op::Name, &[21], "x", &[]);
    m.op_str(Op::Name, &[23], "tmp", &[]);

    m.op(Op::TypeVoid, &[VOID]);
    m.op(Op::TypeFloat, &[FLOAT, 32]);
    m.op(Op::TypeVector, &[VEC3, FLOAT, 3]);
    m.op(Op::TypeInt, &[INT, 32, 1]);
    m.op(Op::TypeFunction, &[FN_VOID, VOID]);
    m.op(Op::TypePointer, &[PTR_FN_FLOAT, 7, FLOAT]);
    m.op(Op::TypeFunction, &[FN_FLOAT, FLOAT, PTR_FN_FLOAT]);
    m.op(Op::TypeStruct, &[LIGHT, VEC3, FLOAT]);
    m.op(Op::TypePointer, &[PTR_UNIFORM_LIGHT, 2, LIGHT]);
    m.op(Op::TypePointer, &[PTR_PRIVATE_INT, 6, INT]);
    m.op(Op::Constant, &[INT, TWO, 2]);
    m.op(Op::Variable, &[PTR_UNIFORM_LIGHT, LIGHTS, 2]);
    m.op(Op::Variable, &[PTR_PRIVATE_INT, COUNTER, 6]);

    // float helper(inout float x)
    m.op(Op::Function, &[FLOAT, HELPER, 0, FN_FLOAT]);
    m.op(Op::FunctionParameter, &[PTR_FN_FLOAT, 21]);
    m.op(Op::Label, &[22]);
    if with_lines {
        m.op(Op::Line, &[FILE, 5, 1]);
    }
    m.op(Op::Variable, &[PTR_FN_FLOAT, 23, 7]);
    m.op(Op::Load, &[FLOAT, 24, 21]);
    m.op(Op::ExtInst, &[FLOAT, 25, GLSL_STD, 13, 24]);
    m.op(Op::FMul, &[FLOAT, 26, 25, 25]);
    if with_lines {
        m.op(Op::Line, &[FILE, 8, 1]);
    }
    m.op(Op::ReturnValue, &[26]);
    m.op(Op::FunctionEnd, &[]);

    // void main()
    m.op(Op::Function, &[VOID, MAIN, 0, FN_VOID]);
    m.op(Op::Label, &[60]);
    if with_lines {
        m.op(Op::Line, &[FILE, 12, 1]);
    }
    m.op(Op::ControlBarrier, &[TWO, TWO, TWO]);
    m.op(Op::IAdd, &[INT, 61, TWO, TWO]);
    m.op(Op::ShiftLeftLogical, &[INT, 62, 61, TWO]);
    if with_lines {
        m.op(Op::Line, &[FILE, 15, 1]);
    }
    m.op(Op::Return, &[]);
    m.op(Op::FunctionEnd, &[]);

    let count = m.instruction_count();
    (m.finish(), count)
}
