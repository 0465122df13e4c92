//! Per-function bytecode encoding.
//!
//! Wire format, little-endian throughout:
//! - one opcode byte, then operands in declaration order
//! - register operands are u16 slot indices; bit 15 selects the ref bank
//! - immediates are i32
//! - symbol ordinals are u32; call targets set bit 31 for imports
//! - register lists are a u8 count followed by the registers
//! - debug messages are a u16 length followed by UTF-8 bytes

use crate::ir::{Function, Instr, VReg};
use crate::regalloc::{Allocation, Bank};

use super::{CalleeKind, EncodeError, SymbolIndex};

/// Register operands with this bit set address the ref bank.
pub const REF_REGISTER_BIT: u16 = 1 << 15;

/// Call targets with this bit set address the import table.
pub const IMPORT_ORDINAL_BIT: u32 = 1 << 31;

/// One byte per instruction kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    ConstI32 = 0x01,
    ConstRef = 0x02,
    GlobalLoadI32 = 0x10,
    GlobalStoreI32 = 0x11,
    GlobalLoadRef = 0x12,
    GlobalStoreRef = 0x13,
    AddI32 = 0x20,
    SubI32 = 0x21,
    MulI32 = 0x22,
    Call = 0x30,
    Return = 0x31,
    Trace = 0x40,
    Print = 0x41,
    Break = 0x42,
    CondBreak = 0x43,
}

/// Result of encoding one function.
#[derive(Debug)]
pub struct EncodedFunction {
    pub bytecode: Vec<u8>,
    pub word_register_count: u16,
    pub ref_register_count: u16,
}

/// Encode one function body against its finalized register allocation.
pub fn encode_function(
    func: &Function,
    symbols: &SymbolIndex,
    alloc: &Allocation,
) -> Result<EncodedFunction, EncodeError> {
    let word_register_count = register_count(alloc.word_count)?;
    let ref_register_count = register_count(alloc.ref_count)?;

    let mut enc = Encoder {
        out: Vec::new(),
        alloc,
    };
    for instr in &func.body {
        enc.instr(instr, symbols)?;
    }

    Ok(EncodedFunction {
        bytecode: enc.out,
        word_register_count,
        ref_register_count,
    })
}

fn register_count(count: usize) -> Result<u16, EncodeError> {
    if count >= REF_REGISTER_BIT as usize {
        return Err(EncodeError::RegisterOverflow(count));
    }
    Ok(count as u16)
}

struct Encoder<'a> {
    out: Vec<u8>,
    alloc: &'a Allocation,
}

impl Encoder<'_> {
    fn instr(&mut self, instr: &Instr, symbols: &SymbolIndex) -> Result<(), EncodeError> {
        match instr {
            Instr::ConstI32 { dst, value } => {
                self.op(Opcode::ConstI32);
                self.reg(*dst)?;
                self.imm32(*value);
            }
            Instr::ConstRef { dst, rodata } => {
                self.op(Opcode::ConstRef);
                self.reg(*dst)?;
                self.ordinal(symbols.rodata(rodata)?);
            }
            Instr::GlobalLoadI32 { dst, global } => {
                self.op(Opcode::GlobalLoadI32);
                self.reg(*dst)?;
                self.ordinal(symbols.global_word(global)?);
            }
            Instr::GlobalStoreI32 { global, src } => {
                self.op(Opcode::GlobalStoreI32);
                self.reg(*src)?;
                self.ordinal(symbols.global_word(global)?);
            }
            Instr::GlobalLoadRef { dst, global } => {
                self.op(Opcode::GlobalLoadRef);
                self.reg(*dst)?;
                self.ordinal(symbols.global_ref(global)?);
            }
            Instr::GlobalStoreRef { global, src } => {
                self.op(Opcode::GlobalStoreRef);
                self.reg(*src)?;
                self.ordinal(symbols.global_ref(global)?);
            }
            Instr::AddI32 { dst, lhs, rhs } => {
                self.op(Opcode::AddI32);
                self.reg(*dst)?;
                self.reg(*lhs)?;
                self.reg(*rhs)?;
            }
            Instr::SubI32 { dst, lhs, rhs } => {
                self.op(Opcode::SubI32);
                self.reg(*dst)?;
                self.reg(*lhs)?;
                self.reg(*rhs)?;
            }
            Instr::MulI32 { dst, lhs, rhs } => {
                self.op(Opcode::MulI32);
                self.reg(*dst)?;
                self.reg(*lhs)?;
                self.reg(*rhs)?;
            }
            Instr::Call {
                callee,
                args,
                results,
            } => {
                self.op(Opcode::Call);
                let target = match symbols.callee(callee)? {
                    CalleeKind::Import(ordinal) => ordinal | IMPORT_ORDINAL_BIT,
                    CalleeKind::Internal(ordinal) => ordinal,
                };
                self.ordinal(target);
                self.reg_list(args)?;
                self.reg_list(results)?;
            }
            Instr::Return { values } => {
                self.op(Opcode::Return);
                self.reg_list(values)?;
            }
            Instr::Trace { message, values } => {
                self.op(Opcode::Trace);
                self.message(message)?;
                self.reg_list(values)?;
            }
            Instr::Print { message, values } => {
                self.op(Opcode::Print);
                self.message(message)?;
                self.reg_list(values)?;
            }
            Instr::Break => self.op(Opcode::Break),
            Instr::CondBreak { cond } => {
                self.op(Opcode::CondBreak);
                self.reg(*cond)?;
            }
        }
        Ok(())
    }

    fn op(&mut self, opcode: Opcode) {
        self.out.push(opcode as u8);
    }

    fn reg(&mut self, vreg: VReg) -> Result<(), EncodeError> {
        let (bank, slot) = self
            .alloc
            .slot(vreg)
            .ok_or(EncodeError::UnallocatedRegister(vreg.0))?;
        if slot >= REF_REGISTER_BIT as usize {
            return Err(EncodeError::RegisterOverflow(slot));
        }
        let mut encoded = slot as u16;
        if bank == Bank::Ref {
            encoded |= REF_REGISTER_BIT;
        }
        self.out.extend_from_slice(&encoded.to_le_bytes());
        Ok(())
    }

    fn reg_list(&mut self, regs: &[VReg]) -> Result<(), EncodeError> {
        if regs.len() > u8::MAX as usize {
            return Err(EncodeError::TooManyOperands(regs.len()));
        }
        self.out.push(regs.len() as u8);
        for &reg in regs {
            self.reg(reg)?;
        }
        Ok(())
    }

    fn imm32(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn ordinal(&mut self, ordinal: u32) {
        self.out.extend_from_slice(&ordinal.to_le_bytes());
    }

    fn message(&mut self, message: &str) -> Result<(), EncodeError> {
        if message.len() > u16::MAX as usize {
            return Err(EncodeError::MessageTooLong(message.len()));
        }
        self.out
            .extend_from_slice(&(message.len() as u16).to_le_bytes());
        self.out.extend_from_slice(message.as_bytes());
        Ok(())
    }
}
