/// Message templates used when raising errors.
///
/// Templates use positional placeholders (`{0}`, `{1}`, ...) filled in by
/// [`format_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleTable {
    pub id: &'static str,
    /// `{0}` token text, `{1}` offset.
    pub unexpected_token: &'static str,
    /// `{0}` expected kind, `{1}` offset.
    pub expect: &'static str,
    /// `{0}` offset.
    pub multiple_decimal_point: &'static str,
    /// `{0}` offset.
    pub unterminated_string: &'static str,
    /// `{0}` offset.
    pub invalid_escape: &'static str,
    /// `{0}` offset.
    pub not_callable: &'static str,
    /// `{0}` value kind, `{1}` offset.
    pub not_indexable: &'static str,
    /// `{0}` nesting limit, `{1}` offset.
    pub too_deep: &'static str,
}

pub const EN_US: LocaleTable = LocaleTable {
    id: "en-US",
    unexpected_token: "Unexpected token: {0} {1}",
    expect: "Expect {0}: {1}",
    multiple_decimal_point: "Multiple decimal point: {0}",
    unterminated_string: "Unterminated string: {0}",
    invalid_escape: "Invalid escape sequence: {0}",
    not_callable: "Not a function: {0}",
    not_indexable: "Cannot read property of {0}: {1}",
    too_deep: "Expression nested deeper than {0} levels: {1}",
};

pub const ZH_CN: LocaleTable = LocaleTable {
    id: "zh-CN",
    unexpected_token: "意外的 token: {0} {1}",
    expect: "期望 {0}: {1}",
    multiple_decimal_point: "多个小数点: {0}",
    unterminated_string: "未结束的字符串: {0}",
    invalid_escape: "无效的转义序列: {0}",
    not_callable: "不是函数: {0}",
    not_indexable: "无法读取 {0} 的属性: {1}",
    too_deep: "表达式嵌套超过 {0} 层: {1}",
};

const LOCALES: [&LocaleTable; 2] = [&EN_US, &ZH_CN];

/// Looks up a locale by id, falling back to `en-US` for `None` or unknown ids.
pub fn resolve_locale(id: Option<&str>) -> &'static LocaleTable {
    id.and_then(find_locale).unwrap_or(&EN_US)
}

/// Exact lookup; `None` when the id is not registered.
pub fn find_locale(id: &str) -> Option<&'static LocaleTable> {
    LOCALES
        .iter()
        .copied()
        .find(|locale| locale.id.eq_ignore_ascii_case(id))
}

pub fn supported_locales() -> impl Iterator<Item = &'static str> {
    LOCALES.iter().map(|locale| locale.id)
}

/// Replaces `{N}` placeholders with `params[N]`. Placeholders without a matching
/// parameter are left as written.
pub fn format_message(template: &str, params: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        match after[..close].parse::<usize>().ok().and_then(|index| params.get(index)) {
            Some(param) => out.push_str(&param.to_string()),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
