//! Go `fmt` formatting for the print builtins
//!
//! Implements the operand rendering of `Print`, `Println` and `Printf` (and
//! their `Sprint*` counterparts) over interpreter [`Value`]s:
//!
//! - `Sprint`: `%v` of each operand, with a space between two operands when
//!   neither is a string
//! - `Sprintln`: `%v` of each operand separated by spaces, plus a newline
//! - `Sprintf`: verbs `%v %+v %#v %d %b %o %x %X %s %q %f %F %e %E %g %G
//!   %t %c %T %%` with the flags `- + # 0` and space, width and precision
//!   (including `*`)
//!
//! Formatting errors render inline the way Go does, e.g. `%!d(MISSING)`,
//! `%!z(int=5)` and `%!(EXTRA string=x)`.

use crate::memory::value::{format_float, Value, Visiting};
use crate::parser::printer::{quote_rune, quote_string};

/// Flags, width and precision of one directive
#[derive(Debug, Default, Clone, Copy)]
struct Directive {
    minus: bool,
    plus: bool,
    sharp: bool,
    zero: bool,
    space: bool,
    /// `%#v`
    sharp_v: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

pub fn sprint(values: &[Value]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        let is_string = |v: &Value| matches!(v, Value::Str(_));
        if i > 0 && !is_string(value) && !is_string(&values[i - 1]) {
            out.push(' ');
        }
        out.push_str(&value.to_string());
    }
    out
}

pub fn sprintln(values: &[Value]) -> String {
    let mut out = values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

pub fn sprintf(format: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut directive = Directive::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => directive.minus = true,
                '+' => directive.plus = true,
                '#' => directive.sharp = true,
                '0' => directive.zero = true,
                ' ' => directive.space = true,
                _ => break,
            }
            chars.next();
        }

        // Width
        if chars.peek() == Some(&'*') {
            chars.next();
            match args.get(next_arg).and_then(Value::as_int) {
                Some(width) => {
                    directive.minus |= width < 0;
                    directive.width = usize::try_from(width.unsigned_abs()).ok();
                }
                None => out.push_str("%!(BADWIDTH)"),
            }
            next_arg += 1;
        } else {
            directive.width = parse_number(&mut chars);
        }

        // Precision
        if chars.peek() == Some(&'.') {
            chars.next();
            if chars.peek() == Some(&'*') {
                chars.next();
                match args.get(next_arg).and_then(Value::as_int) {
                    Some(precision) if precision >= 0 => {
                        directive.precision = usize::try_from(precision).ok();
                    }
                    _ => out.push_str("%!(BADPREC)"),
                }
                next_arg += 1;
            } else {
                directive.precision = Some(parse_number(&mut chars).unwrap_or(0));
            }
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                out.push_str(&format_operand(verb, directive, arg));
            }
            None => out.push_str(&format!("%!{}(MISSING)", verb)),
        }
    }

    if next_arg < args.len() {
        let extras: Vec<String> = args[next_arg..].iter().map(typed_value).collect();
        out.push_str(&format!("%!(EXTRA {})", extras.join(", ")));
    }
    out
}

fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
    }
    number
}

/// `type=value`, as used by error renderings
fn typed_value(value: &Value) -> String {
    match value {
        Value::Absent => "<nil>".to_string(),
        other => format!("{}={}", other.type_label(), other),
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Absent => "<nil>".to_string(),
        other => other.type_label(),
    }
}

fn bad_verb(verb: char, value: &Value) -> String {
    format!("%!{}({})", verb, typed_value(value))
}

/// Render one operand for one verb
fn format_operand(verb: char, mut directive: Directive, value: &Value) -> String {
    if verb == 'T' {
        return pad(&directive, type_name(value));
    }

    if verb == 'v' {
        directive.sharp_v = directive.sharp;
        directive.sharp = false;
        directive.plus = false;
        return match value {
            Value::Int(_) => format_operand('d', directive, value),
            Value::Float(_) => format_operand('g', directive, value),
            Value::Bool(_) => format_operand('t', directive, value),
            Value::Str(_) if directive.sharp_v => format_operand('q', directive, value),
            Value::Str(_) => format_operand('s', directive, value),
            Value::Slice(_) | Value::Map(_) => format_nested(verb, directive, value, &mut Visiting::new()),
            Value::Absent => pad(&directive, "<nil>".to_string()),
        };
    }

    match (verb, value) {
        (_, Value::Slice(_) | Value::Map(_)) => format_nested(verb, directive, value, &mut Visiting::new()),

        ('d', Value::Int(n)) => format_integer(*n, 10, false, &directive),
        ('b', Value::Int(n)) => format_integer(*n, 2, false, &directive),
        ('o', Value::Int(n)) => format_integer(*n, 8, false, &directive),
        ('x', Value::Int(n)) => format_integer(*n, 16, false, &directive),
        ('X', Value::Int(n)) => format_integer(*n, 16, true, &directive),
        ('c', Value::Int(n)) => {
            let c = u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            pad(&directive, c.to_string())
        }
        ('q', Value::Int(n)) => {
            let c = u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            pad(&directive, quote_rune(c))
        }

        ('f' | 'F' | 'e' | 'E' | 'g' | 'G', Value::Float(x)) => format_number_float(*x, verb, &directive),

        ('s', Value::Str(s)) => {
            let text = match directive.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s.clone(),
            };
            pad(&directive, text)
        }
        ('q', Value::Str(s)) => pad(&directive, quote_string(s)),
        ('x' | 'X', Value::Str(s)) => {
            let mut hex: String = s.bytes().map(|b| format!("{:02x}", b)).collect();
            if verb == 'X' {
                hex = hex.to_uppercase();
            }
            if directive.sharp && !hex.is_empty() {
                hex.insert_str(0, if verb == 'X' { "0X" } else { "0x" });
            }
            pad(&directive, hex)
        }

        ('t', Value::Bool(b)) => pad(&directive, b.to_string()),

        _ => bad_verb(verb, value),
    }
}

/// Containers apply the verb to every element: `[e1 e2]`, `map[k:v]`
fn format_container(verb: char, directive: Directive, value: &Value, visiting: &mut Visiting) -> String {
    match value {
        Value::Slice(slice) => {
            let items: Vec<String> = slice
                .items
                .borrow()
                .iter()
                .map(|item| format_nested(verb, directive, item, visiting))
                .collect();
            format!("[{}]", items.join(" "))
        }
        Value::Map(map) => {
            let entries: Vec<String> = map
                .entries
                .borrow()
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        format_operand(verb, directive, &k.to_value()),
                        format_nested(verb, directive, v, visiting)
                    )
                })
                .collect();
            format!("map[{}]", entries.join(" "))
        }
        other => format_operand(verb, directive, other),
    }
}

/// A container operand or one of its elements. Storage already on the
/// path renders as `<nil>`.
fn format_nested(verb: char, directive: Directive, value: &Value, visiting: &mut Visiting) -> String {
    visiting
        .walk(value, |visiting| match value {
            Value::Slice(_) | Value::Map(_) if directive.sharp_v => go_syntax(value, visiting),
            Value::Slice(_) | Value::Map(_) => format_container(verb, directive, value, visiting),
            other => format_operand(verb, directive, other),
        })
        .unwrap_or_else(|| "<nil>".to_string())
}

/// `%#v` of a container: `[]int{1, 2}`, `map[string]int{"a":1}`
fn go_syntax(value: &Value, visiting: &mut Visiting) -> String {
    match value {
        Value::Slice(slice) => {
            let items: Vec<String> = slice
                .items
                .borrow()
                .iter()
                .map(|item| go_element(item, visiting))
                .collect();
            format!("{}{{{}}}", value.type_label(), items.join(", "))
        }
        Value::Map(map) => {
            let entries: Vec<String> = map
                .entries
                .borrow()
                .iter()
                .map(|(k, v)| format!("{}:{}", go_element(&k.to_value(), visiting), go_element(v, visiting)))
                .collect();
            format!("{}{{{}}}", value.type_label(), entries.join(", "))
        }
        other => go_element(other, visiting),
    }
}

fn go_element(value: &Value, visiting: &mut Visiting) -> String {
    match value {
        Value::Str(s) => quote_string(s),
        Value::Slice(_) | Value::Map(_) => visiting
            .walk(value, |visiting| go_syntax(value, visiting))
            .unwrap_or_else(|| "<nil>".to_string()),
        other => other.to_string(),
    }
}

fn sign_prefix(negative: bool, directive: &Directive) -> &'static str {
    if negative {
        "-"
    } else if directive.plus {
        "+"
    } else if directive.space {
        " "
    } else {
        ""
    }
}

fn format_integer(n: i64, base: u32, upper: bool, directive: &Directive) -> String {
    let magnitude = n.unsigned_abs();
    let mut digits = match base {
        2 => format!("{:b}", magnitude),
        8 => format!("{:o}", magnitude),
        16 if upper => format!("{:X}", magnitude),
        16 => format!("{:x}", magnitude),
        _ => magnitude.to_string(),
    };

    if let Some(precision) = directive.precision {
        if precision == 0 && magnitude == 0 {
            digits.clear();
        } else if digits.len() < precision {
            digits.insert_str(0, &"0".repeat(precision - digits.len()));
        }
    }

    let prefix = match (directive.sharp, base) {
        (true, 16) if upper => "0X",
        (true, 16) => "0x",
        (true, 2) => "0b",
        (true, 8) if !digits.starts_with('0') => "0",
        _ => "",
    };

    // Zero padding goes between the sign/prefix and the digits
    let sign = sign_prefix(n < 0, directive);
    let zero_pad = directive.zero && !directive.minus && directive.precision.is_none();
    zero_padded(sign, prefix, digits, zero_pad, directive)
}

fn format_number_float(x: f64, verb: char, directive: &Directive) -> String {
    if x.is_nan() {
        return pad(directive, "NaN".to_string());
    }
    if x.is_infinite() {
        let sign = if x > 0.0 { "+" } else { "-" };
        return pad(directive, format!("{}Inf", sign));
    }

    let magnitude = x.abs();
    let upper = verb.is_ascii_uppercase() && verb != 'F';
    let digits = match verb {
        'f' | 'F' => format!("{:.*}", directive.precision.unwrap_or(6), magnitude),
        'e' | 'E' => format_exponent(magnitude, directive.precision.unwrap_or(6), upper),
        _ => format_general(magnitude, directive.precision, upper),
    };

    let sign = sign_prefix(x.is_sign_negative(), directive);
    let zero_pad = directive.zero && !directive.minus;
    zero_padded(sign, "", digits, zero_pad, directive)
}

fn zero_padded(sign: &str, prefix: &str, digits: String, zero_pad: bool, directive: &Directive) -> String {
    let len = sign.len() + prefix.len() + digits.len();
    match directive.width {
        Some(width) if zero_pad && width > len => {
            format!("{}{}{}{}", sign, prefix, "0".repeat(width - len), digits)
        }
        _ => pad(directive, format!("{}{}{}", sign, prefix, digits)),
    }
}

/// `d.ddddde±dd` with `precision` fractional digits
fn format_exponent(x: f64, precision: usize, upper: bool) -> String {
    let sci = format!("{:.*e}", precision, x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:02}", mantissa, e, sign, exponent.abs())
}

/// `%g`: shortest representation, or `precision` significant digits
fn format_general(x: f64, precision: Option<usize>, upper: bool) -> String {
    let Some(precision) = precision else {
        let shortest = format_float(x);
        return if upper { shortest.to_uppercase() } else { shortest };
    };

    let significant = precision.max(1);
    let sci = format!("{:.*e}", significant - 1, x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= significant as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        let e = if upper { 'E' } else { 'e' };
        format!("{}{}{}{:02}", trim_fraction(mantissa), e, sign, exponent.abs())
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, x)).to_string()
    }
}

/// Drop trailing zeros (and a bare trailing point) from a decimal fraction
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Pad to the directive's width with spaces, left- or right-justified
fn pad(directive: &Directive, text: String) -> String {
    let len = text.chars().count();
    match directive.width {
        Some(width) if width > len => {
            let fill = " ".repeat(width - len);
            if directive.minus {
                text + &fill
            } else {
                fill + &text
            }
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::{Kind, MapKey, MapValue};
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_sprint_spacing() {
        assert_eq!(sprint(&[Value::Int(1), Value::Int(2)]), "1 2");
        assert_eq!(sprint(&[s("a"), Value::Int(1), s("b")]), "a1b");
        assert_eq!(sprint(&[Value::Bool(true), Value::Float(2.5)]), "true 2.5");
        assert_eq!(sprintln(&[s("x"), Value::Int(3)]), "x 3\n");
        assert_eq!(sprintln(&[]), "\n");
    }

    #[test]
    fn test_integer_verbs() {
        assert_eq!(sprintf("%d|%5d|%-5d|%05d", &[Value::Int(42), Value::Int(42), Value::Int(42), Value::Int(-42)]), "42|   42|42   |-0042");
        assert_eq!(sprintf("%+d % d", &[Value::Int(7), Value::Int(7)]), "+7  7");
        assert_eq!(sprintf("%x %X %#x %b %o %#o", &[
            Value::Int(255),
            Value::Int(255),
            Value::Int(255),
            Value::Int(5),
            Value::Int(8),
            Value::Int(8),
        ]), "ff FF 0xff 101 10 010");
        assert_eq!(sprintf("%c%c", &[Value::Int(72), Value::Int(105)]), "Hi");
        assert_eq!(sprintf("%q", &[Value::Int('a' as i64)]), "'a'");
        assert_eq!(sprintf("%.3d", &[Value::Int(7)]), "007");
    }

    #[test]
    fn test_float_verbs() {
        let pi = Value::Float(3.14159);
        assert_eq!(sprintf("%f", &[pi.clone()]), "3.141590");
        assert_eq!(sprintf("%.2f", &[pi.clone()]), "3.14");
        assert_eq!(sprintf("%8.3f|%-8.1f|", &[pi.clone(), pi.clone()]), "   3.142|3.1     |");
        assert_eq!(sprintf("%e", &[Value::Float(123456.789)]), "1.234568e+05");
        assert_eq!(sprintf("%E", &[Value::Float(0.00012)]), "1.200000E-04");
        assert_eq!(sprintf("%g %g", &[Value::Float(0.5), Value::Float(1e7)]), "0.5 1e+07");
        assert_eq!(sprintf("%.3g %.2g", &[Value::Float(3.14159), Value::Float(100.0)]), "3.14 1e+02");
        assert_eq!(sprintf("%v", &[Value::Float(2.0)]), "2");
        assert_eq!(sprintf("%06.2f", &[Value::Float(-1.5)]), "-01.50");
    }

    #[test]
    fn test_string_and_bool_verbs() {
        assert_eq!(sprintf("%s|%10s|%-6s|%.2s", &[s("go"), s("right"), s("left"), s("trunc")]), "go|     right|left  |tr");
        assert_eq!(sprintf("%q", &[s("a\"b\n")]), "\"a\\\"b\\n\"");
        assert_eq!(sprintf("%x %X", &[s("hi"), s("hi")]), "6869 6869");
        assert_eq!(sprintf("%t %v", &[Value::Bool(true), Value::Bool(false)]), "true false");
        assert_eq!(sprintf("%5t|", &[Value::Bool(true)]), " true|");
    }

    #[test]
    fn test_value_verbs() {
        let xs = Value::new_slice(Kind::Int, vec![Value::Int(1), Value::Int(2)]);
        let map = MapValue::new("string", "int");
        map.entries.borrow_mut().insert(MapKey::Str("a".into()), Value::Int(1));
        let m = Value::Map(map);

        assert_eq!(sprintf("%v %+v", &[xs.clone(), m.clone()]), "[1 2] map[a:1]");
        assert_eq!(sprintf("%d", &[xs.clone()]), "[1 2]");
        assert_eq!(sprintf("%3d", &[xs.clone()]), "[  1   2]");
        assert_eq!(sprintf("%#v", &[xs.clone()]), "[]int{1, 2}");
        assert_eq!(sprintf("%#v", &[m]), "map[string]int{\"a\":1}");
        assert_eq!(sprintf("%#v", &[s("q")]), "\"q\"");
        assert_eq!(sprintf("%+v", &[Value::Int(5)]), "5");
        assert_eq!(sprintf("%v", &[Value::Absent]), "<nil>");
    }

    #[test]
    fn test_self_containing_map_verbs() {
        let map = MapValue::new("string", "any");
        let m = Value::Map(map.clone());
        map.entries.borrow_mut().insert(MapKey::Str("k".into()), Value::Int(2));
        map.entries.borrow_mut().insert(MapKey::Str("self".into()), m.clone());

        assert_eq!(sprintf("%v", &[m.clone()]), "map[k:2 self:<nil>]");
        assert_eq!(sprintf("%#v", &[m.clone()]), "map[string]any{\"k\":2, \"self\":<nil>}");
        assert_eq!(sprintln(&[m]), "map[k:2 self:<nil>]\n");
    }

    #[test]
    fn test_type_verb() {
        let xs = Value::new_slice(Kind::Str, vec![]);
        assert_eq!(
            sprintf("%T %T %T %T %T", &[Value::Int(1), Value::Float(1.0), s(""), xs, Value::Absent]),
            "int float64 string []string <nil>"
        );
    }

    #[test]
    fn test_percent_and_star() {
        assert_eq!(sprintf("100%%", &[]), "100%");
        assert_eq!(sprintf("%*d|%-*d|", &[Value::Int(4), Value::Int(7), Value::Int(3), Value::Int(1)]), "   7|1  |");
        assert_eq!(sprintf("%.*f", &[Value::Int(1), Value::Float(2.26)]), "2.3");
    }

    #[test]
    fn test_formatting_errors() {
        assert_eq!(sprintf("%d %d", &[Value::Int(1)]), "1 %!d(MISSING)");
        assert_eq!(sprintf("%z", &[Value::Int(5)]), "%!z(int=5)");
        assert_eq!(sprintf("%d", &[s("x")]), "%!d(string=x)");
        assert_eq!(sprintf("%s", &[Value::Int(5)]), "%!s(int=5)");
        assert_eq!(sprintf("%d", &[Value::Absent]), "%!d(<nil>)");
        assert_eq!(
            sprintf("x", &[Value::Int(1), s("y")]),
            "x%!(EXTRA int=1, string=y)"
        );
        assert_eq!(sprintf("end%", &[]), "end%!(NOVERB)");
    }
}
