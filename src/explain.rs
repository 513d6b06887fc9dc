//! Explain：把绑定参数按方言字面量写法展开进 SQL（用于日志与调试）。
//!
//! 展开时跳过引号内的内容；`?` 按顺序取参数，`$n`/`@pN`/`:n` 按序号取参数。

use crate::flavor::Flavor;
use crate::value::SqlValue;
use time::macros::format_description;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    #[error("not enough args when interpolating: placeholder #{0}")]
    MissingArgs(usize),
    #[error("failed to format datetime: {0}")]
    Format(String),
}

/// 占位符风格。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Question,
    /// `$1`
    Dollar,
    /// `@p1`
    AtP,
    /// `:1`
    Colon,
}

/// 严格展开：参数不足时报错。
pub fn interpolate(flavor: Flavor, sql: &str, vars: &[SqlValue]) -> Result<String, ExplainError> {
    render(flavor, sql, vars, true)
}

/// 宽松展开：参数不足时保留原占位符，格式化失败时保留原 SQL。
pub fn explain(flavor: Flavor, sql: &str, vars: &[SqlValue]) -> String {
    render(flavor, sql, vars, false).unwrap_or_else(|_| sql.to_string())
}

fn render(
    flavor: Flavor,
    sql: &str,
    vars: &[SqlValue],
    strict: bool,
) -> Result<String, ExplainError> {
    let style = flavor.placeholder_style();
    let mut out = String::with_capacity(sql.len() + vars.len() * 16);
    let mut quote: Option<char> = None;
    let mut next_seq = 0usize;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '?' if style == PlaceholderStyle::Question => {
                next_seq += 1;
                emit(&mut out, flavor, vars, next_seq, "?", strict)?;
            }
            '$' | '@' | ':' if marker_matches(style, c, &sql[i + c.len_utf8()..]) => {
                let start = i;
                if c == '@' {
                    // 跳过 `p`/`P`
                    chars.next();
                }
                let mut end = start;
                let mut n = 0usize;
                while let Some(&(j, d)) = chars.peek() {
                    let Some(digit) = d.to_digit(10) else { break };
                    n = n * 10 + digit as usize;
                    end = j + d.len_utf8();
                    chars.next();
                }
                emit(&mut out, flavor, vars, n, &sql[start..end], strict)?;
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// 判断 `$`/`@`/`:` 之后是否是本风格的编号占位符（编号不以 0 开头）。
fn marker_matches(style: PlaceholderStyle, c: char, rest: &str) -> bool {
    let digits = match (style, c) {
        (PlaceholderStyle::Dollar, '$') | (PlaceholderStyle::Colon, ':') => rest,
        (PlaceholderStyle::AtP, '@') => match rest.strip_prefix(['p', 'P']) {
            Some(r) => r,
            None => return false,
        },
        _ => return false,
    };
    matches!(digits.chars().next(), Some('1'..='9'))
}

fn emit(
    out: &mut String,
    flavor: Flavor,
    vars: &[SqlValue],
    n: usize,
    raw: &str,
    strict: bool,
) -> Result<(), ExplainError> {
    match n.checked_sub(1).and_then(|idx| vars.get(idx)) {
        Some(v) => encode_value(out, v, flavor),
        None if strict => Err(ExplainError::MissingArgs(n)),
        None => {
            out.push_str(raw);
            Ok(())
        }
    }
}

fn encode_value(out: &mut String, v: &SqlValue, flavor: Flavor) -> Result<(), ExplainError> {
    match v {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => match flavor {
            Flavor::Oracle | Flavor::SQLServer => out.push_str(if *b { "1" } else { "0" }),
            _ => out.push_str(if *b { "TRUE" } else { "FALSE" }),
        },
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F64(n) => out.push_str(&n.to_string()),
        SqlValue::String(s) => quote_string(out, s),
        SqlValue::Bytes(b) => encode_bytes(out, b, flavor),
        SqlValue::DateTime(dt) => encode_datetime(out, dt, flavor)?,
    }
    Ok(())
}

fn quote_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

fn encode_bytes(out: &mut String, data: &[u8], flavor: Flavor) {
    if data.is_empty() {
        out.push_str("NULL");
        return;
    }
    match flavor {
        Flavor::PostgreSQL => {
            out.push_str("'\\x");
            push_hex(out, data);
            out.push('\'');
        }
        Flavor::SQLServer | Flavor::CQL => {
            out.push_str("0x");
            push_hex(out, data);
        }
        Flavor::Oracle => {
            out.push_str("hextoraw('");
            push_hex(out, data);
            out.push_str("')");
        }
        _ => {
            out.push_str("X'");
            push_hex(out, data);
            out.push('\'');
        }
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

fn encode_datetime(
    out: &mut String,
    dt: &time::OffsetDateTime,
    flavor: Flavor,
) -> Result<(), ExplainError> {
    let body = dt
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        ))
        .map_err(|e| ExplainError::Format(e.to_string()))?;

    match flavor {
        Flavor::Oracle => {
            out.push_str("to_timestamp('");
            out.push_str(&body);
            out.push_str("', 'YYYY-MM-DD HH24:MI:SS.FF')");
        }
        Flavor::PostgreSQL | Flavor::SQLServer => {
            let offset = dt
                .offset()
                .format(format_description!(
                    "[offset_hour sign:mandatory]:[offset_minute]"
                ))
                .map_err(|e| ExplainError::Format(e.to_string()))?;
            out.push('\'');
            out.push_str(&body);
            out.push(' ');
            out.push_str(&offset);
            out.push('\'');
        }
        _ => {
            out.push('\'');
            out.push_str(&body);
            out.push('\'');
        }
    }
    Ok(())
}
