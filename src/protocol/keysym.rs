//! X11 keysym lookup for keyboard injection.
//!
//! The table is static: named keys map to their X11 values, characters
//! map to their Latin-1 codepoint or, beyond that, to the X11 Unicode
//! range at `0x0100_0000 + codepoint`.

pub const BACKSPACE: u32 = 0xff08;
pub const TAB: u32 = 0xff09;
pub const RETURN: u32 = 0xff0d;
pub const PAUSE: u32 = 0xff13;
pub const ESCAPE: u32 = 0xff1b;
pub const HOME: u32 = 0xff50;
pub const LEFT: u32 = 0xff51;
pub const UP: u32 = 0xff52;
pub const RIGHT: u32 = 0xff53;
pub const DOWN: u32 = 0xff54;
pub const PAGE_UP: u32 = 0xff55;
pub const PAGE_DOWN: u32 = 0xff56;
pub const END: u32 = 0xff57;
pub const PRINT: u32 = 0xff61;
pub const INSERT: u32 = 0xff63;
pub const MENU: u32 = 0xff67;
pub const F1: u32 = 0xffbe;
pub const SHIFT_L: u32 = 0xffe1;
pub const SHIFT_R: u32 = 0xffe2;
pub const CONTROL_L: u32 = 0xffe3;
pub const CONTROL_R: u32 = 0xffe4;
pub const CAPS_LOCK: u32 = 0xffe5;
pub const META_L: u32 = 0xffe7;
pub const META_R: u32 = 0xffe8;
pub const ALT_L: u32 = 0xffe9;
pub const ALT_R: u32 = 0xffea;
pub const SUPER_L: u32 = 0xffeb;
pub const SUPER_R: u32 = 0xffec;
pub const DELETE: u32 = 0xffff;

/// Resolves a key name to its keysym.
///
/// Accepts the symbolic names below, `F1`..`F12`, and any single
/// character.
pub fn lookup(name: &str) -> Option<u32> {
    let sym = match name {
        "BackSpace" => BACKSPACE,
        "Tab" => TAB,
        "Return" | "Enter" => RETURN,
        "Pause" => PAUSE,
        "Escape" | "Esc" => ESCAPE,
        "Home" => HOME,
        "Left" => LEFT,
        "Up" => UP,
        "Right" => RIGHT,
        "Down" => DOWN,
        "Page_Up" | "PageUp" => PAGE_UP,
        "Page_Down" | "PageDown" => PAGE_DOWN,
        "End" => END,
        "Print" => PRINT,
        "Insert" | "Ins" => INSERT,
        "Menu" => MENU,
        "Shift" | "Shift_L" => SHIFT_L,
        "Shift_R" => SHIFT_R,
        "Ctrl" | "Control" | "Control_L" => CONTROL_L,
        "Control_R" => CONTROL_R,
        "Caps_Lock" | "CapsLock" => CAPS_LOCK,
        "Meta" | "Meta_L" => META_L,
        "Meta_R" => META_R,
        "Alt" | "Alt_L" => ALT_L,
        "Alt_R" => ALT_R,
        "Super" | "Super_L" | "Cmd" | "Win" => SUPER_L,
        "Super_R" => SUPER_R,
        "Delete" | "Del" => DELETE,
        "Space" => 0x20,
        _ => {
            if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
                if (1..=12).contains(&n) {
                    return Some(F1 + n - 1);
                }
            }
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            return for_char(c).map(|(sym, _)| sym);
        }
    };
    Some(sym)
}

/// Resolves a character to the keysym to send and whether the key sits
/// on the shifted layer of a US keyboard.
///
/// Shifted symbols resolve to their unshifted key: typing `!` presses
/// the `1` key under Shift.
pub fn for_char(c: char) -> Option<(u32, bool)> {
    match c {
        '\n' | '\r' => Some((RETURN, false)),
        '\t' => Some((TAB, false)),
        'A'..='Z' => Some((c as u32, true)),
        '~' => Some(('`' as u32, true)),
        '!' => Some(('1' as u32, true)),
        '@' => Some(('2' as u32, true)),
        '#' => Some(('3' as u32, true)),
        '$' => Some(('4' as u32, true)),
        '%' => Some(('5' as u32, true)),
        '^' => Some(('6' as u32, true)),
        '&' => Some(('7' as u32, true)),
        '*' => Some(('8' as u32, true)),
        '(' => Some(('9' as u32, true)),
        ')' => Some(('0' as u32, true)),
        '_' => Some(('-' as u32, true)),
        '+' => Some(('=' as u32, true)),
        '{' => Some(('[' as u32, true)),
        '}' => Some((']' as u32, true)),
        '|' => Some(('\\' as u32, true)),
        ':' => Some((';' as u32, true)),
        '"' => Some(('\'' as u32, true)),
        '<' => Some((',' as u32, true)),
        '>' => Some(('.' as u32, true)),
        '?' => Some(('/' as u32, true)),
        ' '..='\u{7e}' => Some((c as u32, false)),
        '\u{a0}'..='\u{ff}' => Some((c as u32, false)),
        c if c as u32 >= 0x100 => Some((0x0100_0000 + c as u32, false)),
        _ => None,
    }
}
