//! Symbolic names for the button and absolute axis codes a pad reports.

static BUTTON_NAMES: phf::Map<u16, &'static str> = phf::phf_map! {
    0x100u16 => "BTN_0",
    0x101u16 => "BTN_1",
    0x102u16 => "BTN_2",
    0x103u16 => "BTN_3",
    0x104u16 => "BTN_4",
    0x105u16 => "BTN_5",
    0x106u16 => "BTN_6",
    0x107u16 => "BTN_7",
    0x108u16 => "BTN_8",
    0x109u16 => "BTN_9",
    0x110u16 => "BTN_LEFT",
    0x111u16 => "BTN_RIGHT",
    0x112u16 => "BTN_MIDDLE",
    0x113u16 => "BTN_SIDE",
    0x114u16 => "BTN_EXTRA",
    0x115u16 => "BTN_FORWARD",
    0x116u16 => "BTN_BACK",
    0x117u16 => "BTN_TASK",
    0x130u16 => "BTN_SOUTH",
    0x131u16 => "BTN_EAST",
    0x132u16 => "BTN_C",
    0x133u16 => "BTN_NORTH",
    0x134u16 => "BTN_WEST",
    0x135u16 => "BTN_Z",
    0x136u16 => "BTN_TL",
    0x137u16 => "BTN_TR",
    0x138u16 => "BTN_TL2",
    0x139u16 => "BTN_TR2",
    0x13au16 => "BTN_SELECT",
    0x13bu16 => "BTN_START",
    0x13cu16 => "BTN_MODE",
    0x140u16 => "BTN_TOOL_PEN",
    0x141u16 => "BTN_TOOL_RUBBER",
    0x142u16 => "BTN_TOOL_BRUSH",
    0x143u16 => "BTN_TOOL_PENCIL",
    0x144u16 => "BTN_TOOL_AIRBRUSH",
    0x145u16 => "BTN_TOOL_FINGER",
    0x146u16 => "BTN_TOOL_MOUSE",
    0x147u16 => "BTN_TOOL_LENS",
    0x14au16 => "BTN_TOUCH",
    0x14bu16 => "BTN_STYLUS",
    0x14cu16 => "BTN_STYLUS2",
    0x150u16 => "BTN_GEAR_DOWN",
    0x151u16 => "BTN_GEAR_UP",
};

static ABS_NAMES: phf::Map<u16, &'static str> = phf::phf_map! {
    0x00u16 => "ABS_X",
    0x01u16 => "ABS_Y",
    0x02u16 => "ABS_Z",
    0x03u16 => "ABS_RX",
    0x04u16 => "ABS_RY",
    0x05u16 => "ABS_RZ",
    0x06u16 => "ABS_THROTTLE",
    0x07u16 => "ABS_RUDDER",
    0x08u16 => "ABS_WHEEL",
    0x09u16 => "ABS_GAS",
    0x0au16 => "ABS_BRAKE",
    0x18u16 => "ABS_PRESSURE",
    0x19u16 => "ABS_DISTANCE",
    0x1au16 => "ABS_TILT_X",
    0x1bu16 => "ABS_TILT_Y",
    0x28u16 => "ABS_MISC",
};

#[inline]
pub fn get_button_name(code: u16) -> &'static str {
    BUTTON_NAMES.get(&code).copied().unwrap_or("UNKNOWN")
}

#[inline]
pub fn get_abs_name(code: u16) -> &'static str {
    ABS_NAMES.get(&code).copied().unwrap_or("UNKNOWN")
}

/// Resolve a button identifier (numeric code or symbolic name) to a code.
/// The lookup is case-insensitive for symbolic names.
pub fn resolve_button_code(identifier: &str) -> Option<u16> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(code) = trimmed.parse::<u16>() {
        return Some(code);
    }

    let normalized = trimmed.to_ascii_uppercase();
    BUTTON_NAMES
        .entries()
        .find_map(|(code, name)| (*name == normalized).then_some(*code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_resolver() {
        assert_eq!(get_button_name(0x100), "BTN_0");
        assert_eq!(resolve_button_code("btn_0"), Some(0x100));
        assert_eq!(resolve_button_code(" 256 "), Some(256));
        assert_eq!(resolve_button_code("BTN_NOPE"), None);
        assert_eq!(get_abs_name(0x08), "ABS_WHEEL");
        assert_eq!(get_abs_name(0x3f), "UNKNOWN");
    }
}
