// src/backend/fanotify/records.rs

//! Decoder for the byte stream read from a fanotify descriptor.
//!
//! Layout (all native endian):
//!
//! ```text
//! fanotify_event_metadata     event_len:u32 vers:u8 reserved:u8
//!                             metadata_len:u16 mask:u64 fd:i32 pid:i32
//! fanotify_event_info_header  info_type:u8 pad:u8 len:u16
//! fsid                        2 x i32
//! file_handle                 handle_bytes:u32 handle_type:i32 f_handle[..]
//! name (DFID_NAME kinds)      NUL-terminated entry name
//! ```
//!
//! Only the first info record of an event is looked at.

use crate::backend::FileHandleRef;
use crate::types::EventMask;

pub const FANOTIFY_METADATA_VERSION: u8 = 3;
pub const METADATA_LEN: usize = 24;
pub const FAN_NOFD: i32 = -1;

pub const FAN_EVENT_INFO_TYPE_FID: u8 = 1;
pub const FAN_EVENT_INFO_TYPE_DFID_NAME: u8 = 2;
pub const FAN_EVENT_INFO_TYPE_DFID: u8 = 3;
pub const FAN_EVENT_INFO_TYPE_OLD_DFID_NAME: u8 = 10;
pub const FAN_EVENT_INFO_TYPE_NEW_DFID_NAME: u8 = 12;

const INFO_HEADER_LEN: usize = 4;
const FSID_LEN: usize = 8;
const HANDLE_HEADER_LEN: usize = 8;

/// What the info part of an event carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventInfo {
    Handle(FileHandleRef),
    /// No info record at all (queue overflow).
    None,
    /// An info record kind this decoder does not handle.
    Unsupported(u8),
}

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub mask: EventMask,
    /// Event descriptor; `FAN_NOFD` when the group reports file handles.
    pub fd: i32,
    pub pid: i32,
    pub info: EventInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    VersionMismatch { found: u8 },
    Truncated { offset: usize },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::VersionMismatch { found } => write!(
                f,
                "fanotify metadata version {found}, expected {FANOTIFY_METADATA_VERSION}"
            ),
            RecordError::Truncated { offset } => {
                write!(f, "truncated fanotify record at offset {offset}")
            }
        }
    }
}

/// Decode every complete event in `buf`.
///
/// Iteration stops at the first incomplete event, like `FAN_EVENT_OK`.
/// Structural damage inside a complete event is an error.
pub fn parse_events(buf: &[u8]) -> Result<Vec<EventRecord>, RecordError> {
    let mut records = Vec::new();
    let mut offset = 0;

    while buf.len() - offset >= METADATA_LEN {
        let event = &buf[offset..];
        let event_len = read_u32(event, 0) as usize;
        if event_len < METADATA_LEN || event_len > event.len() {
            break;
        }

        let vers = event[4];
        if vers != FANOTIFY_METADATA_VERSION {
            return Err(RecordError::VersionMismatch { found: vers });
        }

        let metadata_len = read_u16(event, 6) as usize;
        if metadata_len < METADATA_LEN || metadata_len > event_len {
            return Err(RecordError::Truncated { offset });
        }

        let info = parse_info(&event[metadata_len..event_len])
            .ok_or(RecordError::Truncated { offset: offset + metadata_len })?;

        records.push(EventRecord {
            mask: read_u64(event, 8),
            fd: read_i32(event, 16),
            pid: read_i32(event, 20),
            info,
        });

        offset += event_len;
    }

    Ok(records)
}

fn parse_info(info: &[u8]) -> Option<EventInfo> {
    if info.is_empty() {
        return Some(EventInfo::None);
    }
    if info.len() < INFO_HEADER_LEN {
        return None;
    }

    let info_type = info[0];
    let record_len = read_u16(info, 2) as usize;
    if record_len < INFO_HEADER_LEN || record_len > info.len() {
        return None;
    }
    let record = &info[..record_len];

    let has_name = match info_type {
        FAN_EVENT_INFO_TYPE_FID | FAN_EVENT_INFO_TYPE_DFID => false,
        FAN_EVENT_INFO_TYPE_DFID_NAME
        | FAN_EVENT_INFO_TYPE_OLD_DFID_NAME
        | FAN_EVENT_INFO_TYPE_NEW_DFID_NAME => true,
        other => return Some(EventInfo::Unsupported(other)),
    };

    let handle_start = INFO_HEADER_LEN + FSID_LEN;
    let bytes_start = handle_start + HANDLE_HEADER_LEN;
    if record.len() < bytes_start {
        return None;
    }
    let handle_bytes = read_u32(record, handle_start) as usize;
    let handle_type = read_i32(record, handle_start + 4);
    let bytes_end = bytes_start.checked_add(handle_bytes)?;
    if bytes_end > record.len() {
        return None;
    }

    let name = if has_name {
        let tail = &record[bytes_end..];
        let nul = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(tail[..nul].to_vec())
    } else {
        None
    };

    Some(EventInfo::Handle(FileHandleRef {
        handle_type,
        handle: record[bytes_start..bytes_end].to_vec(),
        name,
    }))
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[at..at + 4]);
    u32::from_ne_bytes(raw)
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    read_u32(buf, at) as i32
}

fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    u64::from_ne_bytes(raw)
}
