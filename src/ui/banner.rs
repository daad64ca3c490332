use colored::{Color, Colorize};
use rand::seq::IndexedRandom;

const LOGO: &str = r#"
  ___  ___ ___ ___ ___ _____ ___ ___  ___  ___ ___
 / __|/ __| _ \_ _| _ \_   _| __/ _ \| _ \/ __| __|
 \__ \ (__|   /| ||  _/ | | | _| (_) |   / (_ | _|
 |___/\___|_|_\___|_|   |_| |_| \___/|_|_\\___|___|
"#;

const RAINBOW: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

/// 每个字符随机着色
pub fn rainbow(text: &str) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(text.len() * 8);
    for ch in text.chars() {
        if ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        let color = RAINBOW.choose(&mut rng).copied().unwrap_or(Color::White);
        out.push_str(&ch.to_string().color(color).to_string());
    }
    out
}

/// 启动横幅，纯装饰
pub fn display_intro() {
    println!("{}", rainbow(LOGO));
    println!("{}\n", "Welcome to scriptforge! 🏭".bright_blue().bold());
}
