use super::{find_locale, format_message, resolve_locale, supported_locales, EN_US, ZH_CN};

#[test]
fn resolves_known_and_fallback_locales() {
    assert_eq!(resolve_locale(None), &EN_US);
    assert_eq!(resolve_locale(Some("zh-CN")), &ZH_CN);
    assert_eq!(resolve_locale(Some("zh-cn")), &ZH_CN);
    assert_eq!(resolve_locale(Some("fr-FR")), &EN_US);
    assert!(find_locale("fr-FR").is_none());
    assert_eq!(supported_locales().collect::<Vec<_>>(), vec!["en-US", "zh-CN"]);
}

#[test]
fn formats_positional_parameters() {
    assert_eq!(format_message(EN_US.expect, &[&"Number", &4]), "Expect Number: 4");
    assert_eq!(format_message(ZH_CN.expect, &[&"Boolean", &0]), "期望 Boolean: 0");
}

#[test]
fn keeps_unmatched_placeholders() {
    assert_eq!(format_message("{0} and {1}", &[&"a"]), "a and {1}");
    assert_eq!(format_message("{name} {0", &[&"a"]), "{name} {0");
}
