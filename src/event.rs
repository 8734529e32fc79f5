use input_linux_sys::{input_event, EV_ABS, EV_KEY, EV_MSC, EV_REL, EV_SYN};
use std::io::{self, Read};
use std::mem::size_of;

/// Reads a single `input_event` from the reader. Returns Ok(None) on EOF.
pub fn read_event(reader: &mut impl Read) -> io::Result<Option<input_event>> {
    let mut buf = [0u8; size_of::<input_event>()];
    match reader.read_exact(&mut buf) {
        Ok(()) => {
            // SAFETY: input_event is plain old data; any bit pattern is a valid value.
            let event: input_event = unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const _) };
            Ok(Some(event))
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Serializes events into their raw byte representation, as written by the
/// kernel to an evdev node.
pub fn events_to_bytes(events: &[input_event]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(std::mem::size_of_val(events));
    for ev in events {
        // SAFETY: input_event is POD and `ev` points to a live value of that size.
        let raw = unsafe {
            std::slice::from_raw_parts(ev as *const _ as *const u8, size_of::<input_event>())
        };
        bytes.extend_from_slice(raw);
    }
    bytes
}

/// Calculates the event timestamp in microseconds from its timeval.
///
/// Negative fields read as zero and out-of-range seconds saturate, since the
/// timeval comes straight from the input stream.
#[inline]
pub fn event_microseconds(event: &input_event) -> u64 {
    (event.time.tv_sec.max(0) as u64)
        .saturating_mul(1_000_000)
        .saturating_add(event.time.tv_usec.max(0) as u64)
}

/// Human-readable name of an event type, for logs.
pub fn get_event_type_name(type_: u16) -> &'static str {
    match i32::from(type_) {
        EV_SYN => "EV_SYN",
        EV_KEY => "EV_KEY",
        EV_REL => "EV_REL",
        EV_ABS => "EV_ABS",
        EV_MSC => "EV_MSC",
        _ => "EV_UNKNOWN",
    }
}
