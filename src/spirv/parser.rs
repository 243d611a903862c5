//! SPIR-V Introspection
//!
//! [`SpirvParser`] walks a compiled module exactly once and builds the
//! structural summary the debugger panels work from:
//!
//! - user-defined structs and their members
//! - uniform-class and global variable declarations, in declaration order
//! - functions with return type, arguments, locals and source line range
//! - compute workgroup size and barrier usage
//! - per-category instruction statistics
//!
//! # Failure policy
//!
//! Introspection is best-effort. Truncated or malformed modules stop the walk
//! early but keep everything gathered so far; references to unknown ids
//! resolve to [`ValueType::Unknown`]. Nothing here panics on bad input.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut parser = SpirvParser::new();
//! parser.parse(&spirv_words, true);
//! for (name, func) in &parser.functions {
//!     println!("{name}: lines {:?}..{:?}", func.line_start, func.line_end);
//! }
//! ```

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use spirv::{ExecutionMode, ExecutionModel, Op, StorageClass};

use super::opcodes::{InstructionCategory, InstructionCounts, classify};
use super::reader::WordReader;

/// Type category of a reflected variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Bool,
    Int,
    Float,
    Vector,
    Matrix,
    Struct,
    #[default]
    Unknown,
}

/// A reflected variable, argument, struct member or return type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value_type: ValueType,
    /// Scalar category for vectors/matrices, the type itself otherwise.
    pub base_type: ValueType,
    /// Vector width, matrix column count, or struct member count.
    pub component_count: u32,
    /// Human-readable spelling (`vec3`, `mat4`, the struct name, ...).
    pub type_name: String,
}

/// A reflected function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    /// Name as emitted by the compiler, before trimming.
    pub raw_name: String,
    /// Source file of the first line annotation, if any.
    pub file: Option<String>,
    /// `None` when the module carries no line annotations for this function.
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    pub arguments: Vec<Variable>,
    pub locals: Vec<Variable>,
    pub return_type: Variable,
}

/// An `OpEntryPoint` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    /// `None` for execution models this reader does not know.
    pub execution_model: Option<ExecutionModel>,
    /// Key of the implementing function in [`SpirvParser::functions`].
    pub function: Option<String>,
}

/// Structural summary of a SPIR-V module.
#[derive(Debug, Clone, PartialEq)]
pub struct SpirvParser {
    pub functions: BTreeMap<String, Function>,
    pub user_types: BTreeMap<String, Vec<Variable>>,
    pub uniforms: Vec<Variable>,
    pub globals: Vec<Variable>,
    pub entry_points: Vec<EntryPoint>,

    pub local_size_x: u32,
    pub local_size_y: u32,
    pub local_size_z: u32,
    pub barrier_used: bool,

    pub counts: InstructionCounts,
    /// Every instruction consumed, counted or not.
    pub instruction_count: u32,
    /// SPIR-V version from the header, `(major, minor)`.
    pub version: (u8, u8),
    /// `false` when the walk stopped early on malformed input.
    pub complete: bool,
}

impl Default for SpirvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SpirvParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            user_types: BTreeMap::new(),
            uniforms: Vec::new(),
            globals: Vec::new(),
            entry_points: Vec::new(),
            local_size_x: 1,
            local_size_y: 1,
            local_size_z: 1,
            barrier_used: false,
            counts: InstructionCounts::default(),
            instruction_count: 0,
            version: (0, 0),
            complete: false,
        }
    }

    /// Parses `words`, replacing any previous summary.
    ///
    /// With `trim_function_names`, compiler decorations such as `main(vf4;`
    /// or `@main(` collapse to `main`. Trimmed names that would collide keep
    /// their raw spelling instead.
    pub fn parse(&mut self, words: &[u32], trim_function_names: bool) {
        *self = Self::new();

        if words.first() == Some(&spirv::MAGIC_NUMBER.swap_bytes()) {
            log::debug!("SPIR-V module is byte-swapped, normalizing");
            let swapped: Vec<u32> = words.iter().map(|w| w.swap_bytes()).collect();
            self.parse_native(&swapped, trim_function_names);
        } else {
            self.parse_native(words, trim_function_names);
        }
    }

    /// Looks up a function by its (possibly trimmed) key.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Returns the function whose line range contains `line`.
    #[must_use]
    pub fn function_at_line(&self, line: u32) -> Option<(&str, &Function)> {
        self.functions
            .iter()
            .find(|(_, f)| matches!((f.line_start, f.line_end), (Some(s), Some(e)) if s <= line && line <= e))
            .map(|(name, f)| (name.as_str(), f))
    }

    fn parse_native(&mut self, words: &[u32], trim: bool) {
        let mut reader = WordReader::new(words);

        let Some(header) = reader.read_words(5) else {
            log::warn!("SPIR-V module too short for a header ({} words)", words.len());
            return;
        };
        if header[0] != spirv::MAGIC_NUMBER {
            log::warn!("Not a SPIR-V module (magic {:#010x})", header[0]);
            return;
        }
        self.version = (((header[1] >> 16) & 0xff) as u8, ((header[1] >> 8) & 0xff) as u8);

        let mut state = ParseState::new(trim);

        loop {
            let Some(first) = reader.next() else {
                self.complete = true;
                break;
            };

            let word_count = (first >> 16) as usize;
            let opcode = first & 0xffff;

            if word_count == 0 {
                log::warn!("Malformed SPIR-V instruction at word {}", reader.position() - 1);
                break;
            }
            let Some(operands) = reader.read_words(word_count - 1) else {
                log::warn!("Truncated SPIR-V instruction (opcode {opcode})");
                break;
            };

            self.instruction_count += 1;

            if let Some(op) = Op::from_u32(opcode) {
                self.instruction(&mut state, op, operands);
            }
        }

        // A module cut off mid-function still reports what was seen.
        if let Some(pending) = state.current.take() {
            self.insert_function(&mut state, pending);
        }

        for (entry, id) in self.entry_points.iter_mut().zip(&state.entry_function_ids) {
            entry.function = state.function_keys.get(id).cloned();
        }
    }

    fn instruction(&mut self, state: &mut ParseState, op: Op, ops: &[u32]) {
        match op {
            // ---- Debug information ----------------------------------------
            Op::Name if ops.len() >= 2 => {
                state.names.insert(ops[0], decode_string(&ops[1..]));
            }
            Op::MemberName if ops.len() >= 3 => {
                state
                    .member_names
                    .insert((ops[0], ops[1]), decode_string(&ops[2..]));
            }
            Op::String if ops.len() >= 2 => {
                state.strings.insert(ops[0], decode_string(&ops[1..]));
            }
            Op::Line if ops.len() >= 2 => {
                if let Some(pending) = state.current.as_mut() {
                    let line = ops[1];
                    let f = &mut pending.function;
                    if f.file.is_none() {
                        f.file = state.strings.get(&ops[0]).cloned();
                    }
                    f.line_start = Some(f.line_start.map_or(line, |s| s.min(line)));
                    f.line_end = Some(f.line_end.map_or(line, |e| e.max(line)));
                }
            }

            // ---- Module-level declarations --------------------------------
            Op::ExtInstImport if ops.len() >= 2 => {
                if decode_string(&ops[1..]) == "GLSL.std.450" {
                    state.glsl_ext_sets.insert(ops[0]);
                }
            }
            Op::EntryPoint if ops.len() >= 3 => {
                let execution_model = ExecutionModel::from_u32(ops[0]);
                state.entry_function_ids.push(ops[1]);
                self.entry_points.push(EntryPoint {
                    name: decode_string(&ops[2..]),
                    execution_model,
                    function: None,
                });
            }
            Op::ExecutionMode if ops.len() >= 5 => {
                if ops[1] == ExecutionMode::LocalSize as u32 {
                    self.set_local_size(ops[2], ops[3], ops[4]);
                }
            }
            Op::ExecutionModeId if ops.len() >= 5 => {
                if ops[1] == ExecutionMode::LocalSizeId as u32 {
                    let size = |id: u32| state.constants.get(&id).copied().unwrap_or(1);
                    self.set_local_size(size(ops[2]), size(ops[3]), size(ops[4]));
                }
            }

            // ---- Types ----------------------------------------------------
            Op::TypeVoid if !ops.is_empty() => {
                state.types.insert(ops[0], TypeInfo::Void);
            }
            Op::TypeBool if !ops.is_empty() => {
                state.types.insert(ops[0], TypeInfo::Bool);
            }
            Op::TypeInt if ops.len() >= 3 => {
                state.types.insert(
                    ops[0],
                    TypeInfo::Int {
                        width: ops[1],
                        signed: ops[2] != 0,
                    },
                );
            }
            Op::TypeFloat if ops.len() >= 2 => {
                state.types.insert(ops[0], TypeInfo::Float { width: ops[1] });
            }
            Op::TypeVector if ops.len() >= 3 => {
                state.types.insert(
                    ops[0],
                    TypeInfo::Vector {
                        component: ops[1],
                        count: ops[2],
                    },
                );
            }
            Op::TypeMatrix if ops.len() >= 3 => {
                state.types.insert(
                    ops[0],
                    TypeInfo::Matrix {
                        column: ops[1],
                        columns: ops[2],
                    },
                );
            }
            Op::TypeImage if ops.len() >= 3 => {
                state.types.insert(ops[0], TypeInfo::Image { dim: ops[2] });
            }
            Op::TypeSampledImage if ops.len() >= 2 => {
                state
                    .types
                    .insert(ops[0], TypeInfo::SampledImage { image: ops[1] });
            }
            Op::TypeSampler if !ops.is_empty() => {
                state.types.insert(ops[0], TypeInfo::Sampler);
            }
            Op::TypeArray if ops.len() >= 3 => {
                let length = state.constants.get(&ops[2]).copied();
                state.types.insert(
                    ops[0],
                    TypeInfo::Array {
                        element: ops[1],
                        length,
                    },
                );
            }
            Op::TypeRuntimeArray if ops.len() >= 2 => {
                state.types.insert(
                    ops[0],
                    TypeInfo::Array {
                        element: ops[1],
                        length: None,
                    },
                );
            }
            Op::TypePointer if ops.len() >= 3 => {
                state
                    .types
                    .insert(ops[0], TypeInfo::Pointer { pointee: ops[2] });
            }
            Op::TypeStruct if !ops.is_empty() => {
                let id = ops[0];
                let members: SmallVec<[u32; 8]> = ops[1..].iter().copied().collect();
                state.types.insert(id, TypeInfo::Struct { members: members.clone() });

                if let Some(name) = state.names.get(&id).filter(|n| !n.is_empty()).cloned() {
                    let fields = members
                        .iter()
                        .enumerate()
                        .map(|(i, &ty)| {
                            let member = state
                                .member_names
                                .get(&(id, i as u32))
                                .cloned()
                                .unwrap_or_else(|| format!("_m{i}"));
                            state.variable(member, ty)
                        })
                        .collect();
                    self.user_types.insert(name, fields);
                }
            }

            // ---- Constants ------------------------------------------------
            Op::Constant if ops.len() >= 3 => {
                state.constants.insert(ops[1], ops[2]);
            }

            // ---- Variables ------------------------------------------------
            Op::Variable if ops.len() >= 3 => {
                let (type_id, id, storage) = (ops[0], ops[1], ops[2]);
                let name = state
                    .names
                    .get(&id)
                    .filter(|n| !n.is_empty())
                    .cloned()
                    .unwrap_or_default();

                if let Some(pending) = state.current.as_mut() {
                    let var = state_variable(&state.types, &state.names, name, type_id);
                    pending.function.locals.push(var);
                } else {
                    let var = state.variable(name, type_id);
                    match StorageClass::from_u32(storage) {
                        Some(
                            StorageClass::Uniform
                            | StorageClass::UniformConstant
                            | StorageClass::StorageBuffer
                            | StorageClass::PushConstant,
                        ) => self.uniforms.push(var),
                        Some(
                            StorageClass::Private
                            | StorageClass::Workgroup
                            | StorageClass::Input
                            | StorageClass::Output,
                        ) => self.globals.push(var),
                        _ => {}
                    }
                }
            }

            // ---- Functions ------------------------------------------------
            Op::Function if ops.len() >= 2 => {
                if let Some(unterminated) = state.current.take() {
                    self.insert_function(state, unterminated);
                }
                let (return_type_id, id) = (ops[0], ops[1]);
                let raw_name = state
                    .names
                    .get(&id)
                    .filter(|n| !n.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("_function{id}"));
                state.current = Some(PendingFunction {
                    id,
                    function: Function {
                        return_type: state.variable(String::new(), return_type_id),
                        raw_name,
                        ..Function::default()
                    },
                });
            }
            Op::FunctionParameter if ops.len() >= 2 => {
                let (type_id, id) = (ops[0], ops[1]);
                let name = state.names.get(&id).cloned().unwrap_or_default();
                let var = state_variable(&state.types, &state.names, name, type_id);
                if let Some(pending) = state.current.as_mut() {
                    pending.function.arguments.push(var);
                }
            }
            Op::FunctionEnd => {
                if let Some(pending) = state.current.take() {
                    self.insert_function(state, pending);
                }
            }

            // ---- Statistics -----------------------------------------------
            Op::ControlBarrier => {
                self.barrier_used = true;
            }
            Op::ExtInst if ops.len() >= 3 => {
                if state.glsl_ext_sets.contains(&ops[2]) {
                    self.counts.record(InstructionCategory::Arithmetic);
                }
            }
            _ => {
                if let Some(category) = classify(op) {
                    self.counts.record(category);
                }
            }
        }
    }

    fn set_local_size(&mut self, x: u32, y: u32, z: u32) {
        self.local_size_x = x.max(1);
        self.local_size_y = y.max(1);
        self.local_size_z = z.max(1);
    }

    fn insert_function(&mut self, state: &mut ParseState, pending: PendingFunction) {
        let raw = pending.function.raw_name.as_str();
        let mut key = if state.trim {
            trim_function_name(raw).to_owned()
        } else {
            raw.to_owned()
        };

        if self.functions.contains_key(&key) {
            key = raw.to_owned();
        }
        if self.functions.contains_key(&key) {
            key = format!("{raw}#{}", pending.id);
        }

        state.function_keys.insert(pending.id, key.clone());
        self.functions.insert(key, pending.function);
    }
}

/// Strips compiler-generated decorations from a function name.
///
/// glslang spells functions as `name(` followed by a mangled parameter list,
/// and prefixes HLSL entry wrappers with `@`. Names without decorations are
/// returned unchanged.
#[must_use]
pub fn trim_function_name(name: &str) -> &str {
    let name = name.strip_prefix('@').unwrap_or(name);
    let trimmed = name.split('(').next().unwrap_or(name);
    if trimmed.is_empty() { name } else { trimmed }
}

/// Decodes a nul-terminated literal string packed little-endian into words.
fn decode_string(words: &[u32]) -> String {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    'outer: for word in words {
        for b in word.to_le_bytes() {
            if b == 0 {
                break 'outer;
            }
            bytes.push(b);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

// ─── Parse state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TypeInfo {
    Void,
    Bool,
    Int { width: u32, signed: bool },
    Float { width: u32 },
    Vector { component: u32, count: u32 },
    Matrix { column: u32, columns: u32 },
    Image { dim: u32 },
    SampledImage { image: u32 },
    Sampler,
    Array { element: u32, length: Option<u32> },
    Pointer { pointee: u32 },
    Struct { members: SmallVec<[u32; 8]> },
}

struct PendingFunction {
    id: u32,
    function: Function,
}

struct ParseState {
    trim: bool,
    names: FxHashMap<u32, String>,
    member_names: FxHashMap<(u32, u32), String>,
    strings: FxHashMap<u32, String>,
    types: FxHashMap<u32, TypeInfo>,
    constants: FxHashMap<u32, u32>,
    glsl_ext_sets: FxHashSet<u32>,
    entry_function_ids: Vec<u32>,
    function_keys: FxHashMap<u32, String>,
    current: Option<PendingFunction>,
}

impl ParseState {
    fn new(trim: bool) -> Self {
        Self {
            trim,
            names: FxHashMap::default(),
            member_names: FxHashMap::default(),
            strings: FxHashMap::default(),
            types: FxHashMap::default(),
            constants: FxHashMap::default(),
            glsl_ext_sets: FxHashSet::default(),
            entry_function_ids: Vec::new(),
            function_keys: FxHashMap::default(),
            current: None,
        }
    }

    fn variable(&self, name: String, type_id: u32) -> Variable {
        state_variable(&self.types, &self.names, name, type_id)
    }
}

/// Pointer and array nesting deeper than this resolves to `Unknown`.
const MAX_TYPE_DEPTH: u32 = 16;

fn state_variable(
    types: &FxHashMap<u32, TypeInfo>,
    names: &FxHashMap<u32, String>,
    name: String,
    type_id: u32,
) -> Variable {
    let (value_type, base_type, component_count, type_name) =
        describe_type(types, names, type_id, 0);
    Variable {
        name,
        value_type,
        base_type,
        component_count,
        type_name,
    }
}

fn describe_type(
    types: &FxHashMap<u32, TypeInfo>,
    names: &FxHashMap<u32, String>,
    type_id: u32,
    depth: u32,
) -> (ValueType, ValueType, u32, String) {
    let unknown = (ValueType::Unknown, ValueType::Unknown, 0, String::new());
    if depth > MAX_TYPE_DEPTH {
        return unknown;
    }
    let Some(info) = types.get(&type_id) else {
        return unknown;
    };

    match info {
        TypeInfo::Void => (ValueType::Void, ValueType::Void, 0, "void".into()),
        TypeInfo::Bool => (ValueType::Bool, ValueType::Bool, 1, "bool".into()),
        TypeInfo::Int { width, signed } => {
            let name = match (width, signed) {
                (64, true) => "int64_t",
                (64, false) => "uint64_t",
                (_, true) => "int",
                (_, false) => "uint",
            };
            (ValueType::Int, ValueType::Int, 1, name.into())
        }
        TypeInfo::Float { width } => {
            let name = if *width == 64 { "double" } else { "float" };
            (ValueType::Float, ValueType::Float, 1, name.into())
        }
        TypeInfo::Vector { component, count } => {
            let scalar = scalar_category(types, *component);
            let name = format!("{}vec{count}", scalar_prefix(types, *component));
            (ValueType::Vector, scalar, *count, name)
        }
        TypeInfo::Matrix { column, columns } => {
            let (rows, scalar, prefix) = match types.get(column) {
                Some(TypeInfo::Vector { component, count }) => (
                    *count,
                    scalar_category(types, *component),
                    scalar_prefix(types, *component),
                ),
                _ => (0, ValueType::Unknown, ""),
            };
            let name = if rows == *columns {
                format!("{prefix}mat{columns}")
            } else {
                format!("{prefix}mat{columns}x{rows}")
            };
            (ValueType::Matrix, scalar, *columns, name)
        }
        TypeInfo::Struct { members } => {
            let name = names
                .get(&type_id)
                .filter(|n| !n.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("_struct{type_id}"));
            (ValueType::Struct, ValueType::Struct, members.len() as u32, name)
        }
        TypeInfo::Array { element, length } => {
            let (value_type, base_type, count, elem_name) =
                describe_type(types, names, *element, depth + 1);
            let name = match length {
                Some(n) => format!("{elem_name}[{n}]"),
                None => format!("{elem_name}[]"),
            };
            (value_type, base_type, count, name)
        }
        TypeInfo::Pointer { pointee } => describe_type(types, names, *pointee, depth + 1),
        TypeInfo::Image { dim } => (
            ValueType::Unknown,
            ValueType::Unknown,
            0,
            format!("texture{}", dim_suffix(*dim)),
        ),
        TypeInfo::SampledImage { image } => {
            let dim = match types.get(image) {
                Some(TypeInfo::Image { dim }) => dim_suffix(*dim),
                _ => "",
            };
            (ValueType::Unknown, ValueType::Unknown, 0, format!("sampler{dim}"))
        }
        TypeInfo::Sampler => (ValueType::Unknown, ValueType::Unknown, 0, "sampler".into()),
    }
}

fn scalar_category(types: &FxHashMap<u32, TypeInfo>, id: u32) -> ValueType {
    match types.get(&id) {
        Some(TypeInfo::Bool) => ValueType::Bool,
        Some(TypeInfo::Int { .. }) => ValueType::Int,
        Some(TypeInfo::Float { .. }) => ValueType::Float,
        _ => ValueType::Unknown,
    }
}

fn scalar_prefix(types: &FxHashMap<u32, TypeInfo>, id: u32) -> &'static str {
    match types.get(&id) {
        Some(TypeInfo::Bool) => "b",
        Some(TypeInfo::Int { signed: true, .. }) => "i",
        Some(TypeInfo::Int { signed: false, .. }) => "u",
        Some(TypeInfo::Float { width: 64 }) => "d",
        _ => "",
    }
}

fn dim_suffix(dim: u32) -> &'static str {
    match spirv::Dim::from_u32(dim) {
        Some(spirv::Dim::Dim1D) => "1D",
        Some(spirv::Dim::Dim2D) => "2D",
        Some(spirv::Dim::Dim3D) => "3D",
        Some(spirv::Dim::DimCube) => "Cube",
        Some(spirv::Dim::DimBuffer) => "Buffer",
        _ => "",
    }
}
