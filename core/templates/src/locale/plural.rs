/// Returns the index of the plural form `language` uses for `n`.
pub fn plural_form(language: &str, n: i64) -> usize {
    match language {
        "ar_AR" => match n {
            0 => 0,
            1 => 1,
            2 => 2,
            _ if (3..=10).contains(&(n % 100)) => 3,
            _ if n % 100 >= 11 => 4,
            _ => 5,
        },
        "cs_CZ" => match n {
            1 => 0,
            2..=4 => 1,
            _ => 2,
        },
        "id_ID" | "ja_JP" | "zh_CN" | "zh_TW" => 0,
        "fr_FR" | "pt_BR" => usize::from(n > 1),
        "pl_PL" => match n {
            1 => 0,
            _ if few(n) => 1,
            _ => 2,
        },
        "ro_RO" => match n {
            1 => 0,
            _ if n == 0 || (n % 100 > 0 && n % 100 < 20) => 1,
            _ => 2,
        },
        "ru_RU" | "uk_UA" | "sr_RS" => match n {
            _ if n % 10 == 1 && n % 100 != 11 => 0,
            _ if few(n) => 1,
            _ => 2,
        },
        _ => usize::from(n != 1),
    }
}

/// The Slavic "few" category: 2-4, 22-24, 32-34, ... but not 12-14.
fn few(n: i64) -> bool {
    (2..=4).contains(&(n % 10)) && !(10..20).contains(&(n % 100))
}
