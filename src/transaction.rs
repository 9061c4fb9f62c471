//! Transfer transaction construction
//!
//! Builds a single-instruction system-program transfer and serializes it in
//! the legacy message format the wallet signs:
//!
//! ```text
//! header(3) | keys: compact-array<32> | recent_blockhash(32) | instructions: compact-array
//! ```
//!
//! Signing happens outside this crate. A [`SignedTransaction`] is just the
//! message plus the signatures handed back by the wallet.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::address::{Address, Hash, Signature};
use crate::rpc::RecentBlockhash;

/// System program instruction index for `Transfer`
const SYSTEM_TRANSFER_IX: u32 = 2;

/// Append a compact-u16 length prefix (7 bits per byte, little-endian)
pub fn push_compact_u16(buf: &mut Vec<u8>, mut value: u16) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Native SOL transfer between two accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInstruction {
    pub from: Address,
    pub to: Address,
    pub lamports: u64,
}

impl TransferInstruction {
    pub fn data(&self) -> [u8; 12] {
        let mut data = [0u8; 12];
        data[..4].copy_from_slice(&SYSTEM_TRANSFER_IX.to_le_bytes());
        data[4..].copy_from_slice(&self.lamports.to_le_bytes());
        data
    }
}

/// Unsigned transfer transaction; the fee payer is always the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub instruction: TransferInstruction,
    pub recent_blockhash: Hash,
    pub last_valid_block_height: u64,
}

impl Transaction {
    pub fn new_transfer(
        from: Address,
        to: Address,
        lamports: u64,
        recent: RecentBlockhash,
    ) -> Self {
        Self {
            instruction: TransferInstruction { from, to, lamports },
            recent_blockhash: recent.blockhash,
            last_valid_block_height: recent.last_valid_block_height,
        }
    }

    pub fn fee_payer(&self) -> Address {
        self.instruction.from
    }

    /// Ordered account keys: writable signer, writable recipient, program
    fn account_keys(&self) -> Vec<Address> {
        let ix = &self.instruction;
        if ix.from == ix.to {
            vec![ix.from, Address::SYSTEM_PROGRAM]
        } else {
            vec![ix.from, ix.to, Address::SYSTEM_PROGRAM]
        }
    }

    /// Bytes the fee payer signs
    pub fn message_bytes(&self) -> Vec<u8> {
        let keys = self.account_keys();
        let program_index = (keys.len() - 1) as u8;
        let to_index: u8 = if keys.len() == 2 { 0 } else { 1 };
        let data = self.instruction.data();

        let mut buf = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 1 + 4 + data.len() + 1);

        // Header: 1 signer, 0 readonly signers, 1 readonly non-signer (program)
        buf.extend_from_slice(&[1, 0, 1]);

        push_compact_u16(&mut buf, keys.len() as u16);
        for key in &keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(self.recent_blockhash.as_bytes());

        push_compact_u16(&mut buf, 1);
        buf.push(program_index);
        push_compact_u16(&mut buf, 2);
        buf.extend_from_slice(&[0, to_index]);
        push_compact_u16(&mut buf, data.len() as u16);
        buf.extend_from_slice(&data);

        buf
    }

    /// Attach the fee payer's signature
    pub fn with_signature(&self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            signatures: vec![signature],
            message: self.message_bytes(),
        }
    }
}

/// Transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signatures: Vec<Signature>,
    pub message: Vec<u8>,
}

impl SignedTransaction {
    /// The fee payer's signature, which the network uses as the transaction id
    pub fn id(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.signatures.len() * 64 + self.message.len());
        push_compact_u16(&mut buf, self.signatures.len() as u16);
        for sig in &self.signatures {
            buf.extend_from_slice(sig.as_bytes());
        }
        buf.extend_from_slice(&self.message);
        buf
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent() -> RecentBlockhash {
        RecentBlockhash {
            blockhash: Hash::new([9u8; 32]),
            last_valid_block_height: 1_000,
        }
    }

    #[test]
    fn test_compact_u16() {
        let cases: [(u16, &[u8]); 5] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (16383, &[0xff, 0x7f]),
            (16384, &[0x80, 0x80, 0x01]),
        ];
        for (value, expected) in cases {
            let mut buf = Vec::new();
            push_compact_u16(&mut buf, value);
            assert_eq!(buf, expected, "value {}", value);
        }
    }

    #[test]
    fn test_instruction_data_layout() {
        let ix = TransferInstruction {
            from: Address::new([1; 32]),
            to: Address::new([2; 32]),
            lamports: 10_000_000,
        };
        let data = ix.data();
        assert_eq!(&data[..4], &[2, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(data[4..].try_into().unwrap()), 10_000_000);
    }

    #[test]
    fn test_message_layout() {
        let from = Address::new([1; 32]);
        let to = Address::new([2; 32]);
        let tx = Transaction::new_transfer(from, to, 42, recent());
        let msg = tx.message_bytes();

        assert_eq!(msg.len(), 150);
        assert_eq!(&msg[..3], &[1, 0, 1]);
        assert_eq!(msg[3], 3);
        assert_eq!(&msg[4..36], from.as_bytes());
        assert_eq!(&msg[36..68], to.as_bytes());
        assert_eq!(&msg[68..100], Address::SYSTEM_PROGRAM.as_bytes());
        assert_eq!(&msg[100..132], &[9u8; 32]);
        // one instruction, program index 2, accounts [0, 1], 12 data bytes
        assert_eq!(&msg[132..138], &[1, 2, 2, 0, 1, 12]);
        assert_eq!(tx.fee_payer(), from);
    }

    #[test]
    fn test_self_transfer_dedupes_keys() {
        let me = Address::new([5; 32]);
        let tx = Transaction::new_transfer(me, me, 1, recent());
        let msg = tx.message_bytes();

        assert_eq!(msg[3], 2);
        assert_eq!(msg.len(), 150 - 32);
        // program index 1, accounts [0, 0]
        assert_eq!(&msg[100..106], &[1, 1, 2, 0, 0, 12]);
    }

    #[test]
    fn test_signed_wire_format() {
        let tx = Transaction::new_transfer(Address::new([1; 32]), Address::new([2; 32]), 7, recent());
        let sig = Signature::new([3; 64]);
        let signed = tx.with_signature(sig);

        assert_eq!(signed.id(), Some(&sig));
        let wire = signed.to_wire();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], &[3u8; 64]);
        assert_eq!(&wire[65..], tx.message_bytes().as_slice());

        let decoded = STANDARD.decode(signed.to_base64()).unwrap();
        assert_eq!(decoded, wire);
    }
}
