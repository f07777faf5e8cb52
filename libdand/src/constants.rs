// libdand/src/constants.rs
//! Protocol constants shared across the crate

/// Receive buffer capacity of a Dandelion request in bytes
pub const RX_BUFFER_SIZE: usize = 48;

/// Transmit buffer capacity of a Dandelion response in bytes
pub const TX_BUFFER_SIZE: usize = 48;

/// Number of 32-bit words in the mailbox
pub const MAILBOX_SIZE: usize = 64;

// ISO 14443-3 commands recognised by the link layer

/// REQA short frame
pub const NFC_REQA: u8 = 0x26;
/// WUPA short frame, also wakes a halted tag
pub const NFC_WUPA: u8 = 0x52;
/// Time slot marker; ignored
pub const NFC_TIMESLOT: u8 = 0x35;
/// HLTA, first byte of `50 00` + CRC
pub const NFC_HLTA: u8 = 0x50;
/// SELECT / ANTICOLLISION, cascade level 1
pub const NFC_SEL_1: u8 = 0x93;
/// Cascade level 2
pub const NFC_SEL_2: u8 = 0x95;
/// Cascade level 3
pub const NFC_SEL_3: u8 = 0x97;
/// Type 2 tag READ of four blocks
pub const NFC_T2T_READ: u8 = 0x30;

// Proprietary link commands

/// Enter the Dandelion protocol from an active state
pub const NFC_RATS_DAND: u8 = 0x47;
/// Leave the Dandelion protocol; the tag halts
pub const NFC_DESELECT_DAND: u8 = 0x48;
/// First byte of every Dandelion request
pub const NFC_DAND_CMD: u8 = 0x01;

/// Acknowledge of RATS_DAND
pub const NFC_ACK_RATS_DAND: u8 = 0x47;

/// Cascade tag inserted in front of incomplete cascade levels
pub const CASCADE_TAG: u8 = 0x88;

/// NVB value of a full SELECT (7 bytes, no extra bits)
pub const NVB_SELECT: u8 = 0x70;

/// SAK bit signalling that the UID is not complete yet
pub const SAK_CASCADE_BIT: u8 = 0x04;

/// CRC-A preset value
pub const CRC_A_PRESET: u16 = 0x6363;

// Hardware address map. Every range is closed-open `[start, stop)`.

/// First byte of ROM1
pub const ROM1_START: u32 = 0x0000_0000;
/// End of ROM1
pub const ROM1_STOP: u32 = 0x0000_2000;
/// First byte of ROM2
pub const ROM2_START: u32 = 0x0000_2000;
/// End of ROM2
pub const ROM2_STOP: u32 = 0x0000_4000;
/// First byte of RAM1
pub const RAM1_START: u32 = 0x0002_0000;
/// End of RAM1
pub const RAM1_STOP: u32 = 0x0002_2000;
/// First byte of RAM2, which also holds the mailbox
pub const RAM2_START: u32 = 0x2000_0000;
/// End of RAM2
pub const RAM2_STOP: u32 = 0x2000_2000;
/// First peripheral register block
pub const HW1_START: u32 = 0x2000_A000;
/// End of HW1
pub const HW1_STOP: u32 = 0x2000_C800;
/// Second peripheral register block
pub const HW2_START: u32 = 0x2001_0000;
/// End of HW2
pub const HW2_STOP: u32 = 0x2001_8C00;
/// Third peripheral register block
pub const HW3_START: u32 = 0x4000_0000;
/// End of HW3
pub const HW3_STOP: u32 = 0x4000_0400;

/// Start of the NVM window
pub const NVM_BASE: u32 = 0x0001_0000;
/// Size of the NVM window in bytes
pub const NVM_SIZE: u32 = 0x0000_F000;
/// End of the NVM window
pub const NVM_STOP: u32 = NVM_BASE + NVM_SIZE;

/// Number of independently protected NVM pages
pub const NVM_PROT_PAGES: usize = 120;

/// Bytes covered by one NVM protection entry
pub const NVM_PROT_PAGE_SIZE: u32 = NVM_SIZE / NVM_PROT_PAGES as u32;

// Privilege byte encodings: high nibble grants read, low nibble grants write

/// Neither read nor write
pub const PROT_NO_ACCESS: u8 = 0x00;
/// Read only
pub const PROT_READ_ONLY: u8 = 0xF0;
/// Write only
pub const PROT_WRITE_ONLY: u8 = 0x0F;
/// Read and write
pub const PROT_READ_WRITE: u8 = 0xFF;

/// `message_disable` value that keeps send-message enabled
pub const MESSAGE_AND_CALL_ENABLE: u32 = 0xFFFF_FFFF;

/// `bypass_mailbox` value that removes the mailbox window privilege
pub const BYPASS_MAILBOX: u32 = 0xFCA1_FCB0;

/// Default location of the mailbox window in RAM2
pub const DEFAULT_MAILBOX_BASE: u32 = 0x2000_1F00;

// Offsets inside the APARAM image

/// Region privilege bytes
pub const APARAM_PROT_OFFSET: usize = 0x00;
/// `bypass_mailbox` word, little-endian
pub const APARAM_BYPASS_MAILBOX_OFFSET: usize = 0x48;
/// `message_disable` word, little-endian
pub const APARAM_MESSAGE_DISABLE_OFFSET: usize = 0x58;
/// Type 2 tag data pointer; zero means none
pub const APARAM_T2T_PTR_OFFSET: usize = 0x17C;
/// One privilege byte per NVM page
pub const APARAM_NVM_PROT_OFFSET: usize = 0x180;
/// Shortest image that holds every field
pub const APARAM_MIN_LEN: usize = APARAM_NVM_PROT_OFFSET + NVM_PROT_PAGES;
