//! The textual stack-machine protocol consumed by the VM translator.
//!
//! One instruction per line:
//!
//! ``` text
//! push <segment> <index>
//! pop <segment> <index>
//! add | sub | neg | eq | gt | lt | and | or | not
//! label <name>
//! goto <name>
//! if-goto <name>
//! function <Class.name> <nLocals>
//! call <Class.name> <nArgs>
//! return
//! ```

use std::fmt;

/// Named storage regions of the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
	Constant,
	Argument,
	Local,
	Static,
	This,
	That,
	Pointer,
	Temp,
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Segment::Constant => "constant",
			Segment::Argument => "argument",
			Segment::Local => "local",
			Segment::Static => "static",
			Segment::This => "this",
			Segment::That => "that",
			Segment::Pointer => "pointer",
			Segment::Temp => "temp",
		})
	}
}

/// Arithmetic, logic and comparison commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
	Add,
	Sub,
	Neg,
	Eq,
	Gt,
	Lt,
	And,
	Or,
	Not,
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Command::Add => "add",
			Command::Sub => "sub",
			Command::Neg => "neg",
			Command::Eq => "eq",
			Command::Gt => "gt",
			Command::Lt => "lt",
			Command::And => "and",
			Command::Or => "or",
			Command::Not => "not",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
	Push(Segment, u32),
	Pop(Segment, u32),
	Arithmetic(Command),
	Label(String),
	Goto(String),
	IfGoto(String),
	Function { name: String, locals: u32 },
	Call { name: String, args: u32 },
	Return,
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Instruction::Push(segment, index) => write!(f, "push {segment} {index}"),
			Instruction::Pop(segment, index) => write!(f, "pop {segment} {index}"),
			Instruction::Arithmetic(command) => write!(f, "{command}"),
			Instruction::Label(label) => write!(f, "label {label}"),
			Instruction::Goto(label) => write!(f, "goto {label}"),
			Instruction::IfGoto(label) => write!(f, "if-goto {label}"),
			Instruction::Function { name, locals } => write!(f, "function {name} {locals}"),
			Instruction::Call { name, args } => write!(f, "call {name} {args}"),
			Instruction::Return => write!(f, "return"),
		}
	}
}

/// The ordered instructions of one compilation unit. `Display` renders the
/// `.vm` file contents, one instruction per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionStream {
	instructions: Vec<Instruction>,
}

impl InstructionStream {
	pub fn instructions(&self) -> &[Instruction] { &self.instructions }

	pub fn len(&self) -> usize { self.instructions.len() }

	pub fn is_empty(&self) -> bool { self.instructions.is_empty() }

	pub fn iter(&self) -> std::slice::Iter<'_, Instruction> { self.instructions.iter() }
}

impl IntoIterator for InstructionStream {
	type IntoIter = std::vec::IntoIter<Instruction>;
	type Item = Instruction;

	fn into_iter(self) -> Self::IntoIter { self.instructions.into_iter() }
}

impl<'s> IntoIterator for &'s InstructionStream {
	type IntoIter = std::slice::Iter<'s, Instruction>;
	type Item = &'s Instruction;

	fn into_iter(self) -> Self::IntoIter { self.instructions.iter() }
}

impl fmt::Display for InstructionStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for instruction in &self.instructions {
			writeln!(f, "{instruction}")?;
		}
		Ok(())
	}
}

/// Append-only sink for instructions.
#[derive(Debug, Default)]
pub struct VmWriter {
	instructions: Vec<Instruction>,
}

impl VmWriter {
	pub fn new() -> Self { Self::default() }

	pub fn push(&mut self, segment: Segment, index: u32) { self.emit(Instruction::Push(segment, index)) }

	pub fn pop(&mut self, segment: Segment, index: u32) { self.emit(Instruction::Pop(segment, index)) }

	pub fn arithmetic(&mut self, command: Command) { self.emit(Instruction::Arithmetic(command)) }

	pub fn label(&mut self, label: &str) { self.emit(Instruction::Label(label.to_string())) }

	pub fn goto(&mut self, label: &str) { self.emit(Instruction::Goto(label.to_string())) }

	pub fn if_goto(&mut self, label: &str) { self.emit(Instruction::IfGoto(label.to_string())) }

	pub fn function(&mut self, name: String, locals: u32) { self.emit(Instruction::Function { name, locals }) }

	pub fn call(&mut self, name: String, args: u32) { self.emit(Instruction::Call { name, args }) }

	pub fn ret(&mut self) { self.emit(Instruction::Return) }

	pub fn emit(&mut self, instruction: Instruction) { self.instructions.push(instruction) }

	pub fn finish(self) -> InstructionStream { InstructionStream { instructions: self.instructions } }
}
