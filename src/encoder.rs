/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Bit-packing an `Instruction` into its 16-bit wire representation.

use crate::model::Instruction;

/// `opcode(4) | src mode(3) | src reg(3) | dest mode(3) | dest reg(3)`.
pub fn encode(instr: &Instruction) -> u16 {
    let opcode = (instr.opcode as u16 & 0xF) << 12;
    let src_mode = (instr.src_mode as u16 & 0x7) << 9;
    let src_reg = (instr.src_reg as u16 & 0x7) << 6;
    let dest_mode = (instr.dest_mode as u16 & 0x7) << 3;
    let dest_reg = instr.dest_reg as u16 & 0x7;
    opcode | src_mode | src_reg | dest_mode | dest_reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_into_expected_positions() {
        let instr = Instruction {
            opcode: 0x0,
            src_mode: 1,
            src_reg: 0,
            dest_mode: 3,
            dest_reg: 2,
        };
        // mov A, r2 -> opcode 0, src mode 1 (Direct), dest mode 3 (DirectRegister)
        assert_eq!(encode(&instr), 0b0000_001_000_011_010);
    }

    #[test]
    fn hlt_is_all_opcode_bits() {
        let instr = Instruction {
            opcode: 0xF,
            ..Default::default()
        };
        assert_eq!(encode(&instr), 0xF000);
    }
}
