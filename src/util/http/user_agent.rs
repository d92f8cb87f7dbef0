use rand::RngExt;

const FIREFOX_VERSIONS: [&str; 10] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0", "125.0", "124.0",
];

const CHROME_VERSIONS: [&str; 10] = [
    "133.0.6943.50", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110", "131.0.6778.85",
    "131.0.6778.108", "130.0.6723.92", "130.0.6723.117", "129.0.6668.70", "129.0.6668.89",
];

const SAFARI_VERSIONS: [&str; 5] = ["18.2", "18.1", "18.0", "17.7", "17.6"];

// 財經頁面在行動裝置上的版面不同，只用桌面版的系統字串
const OS_STRINGS: [&str; 8] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_5",
    "Macintosh; Intel Mac OS X 14_7_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

fn gen_firefox_ua() -> String {
    let mut rng = rand::rng();
    let version = FIREFOX_VERSIONS[rng.random_range(..FIREFOX_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        os, version, version
    )
}

fn gen_chrome_ua() -> String {
    let mut rng = rand::rng();
    let version = CHROME_VERSIONS[rng.random_range(..CHROME_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

fn gen_safari_desktop_ua() -> String {
    let mut rng = rand::rng();
    let macos_systems: Vec<&str> = OS_STRINGS
        .iter()
        .filter(|os| os.starts_with("Macintosh"))
        .copied()
        .collect();
    let os = macos_systems[rng.random_range(..macos_systems.len())];
    let safari_ver = SAFARI_VERSIONS[rng.random_range(..SAFARI_VERSIONS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Safari/605.1.15",
        os, safari_ver
    )
}

pub fn gen_random_ua() -> String {
    let mut rng = rand::rng();
    match rng.random_range(0..10) {
        0..=5 => gen_chrome_ua(),   // 60% Chrome
        6..=8 => gen_firefox_ua(),  // 30% Firefox
        _ => gen_safari_desktop_ua(), // 10% Safari
    }
}
