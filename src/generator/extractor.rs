/// 代码块分隔符
pub const FENCE: &str = "```";

/// 从模型回复中取出第一个代码块的内容
///
/// 去掉首行（语言标记）以及首尾的空行。任一分隔符缺失时返回空字符串，
/// 调用方必须把空结果当作提取失败处理。
pub fn extract_code(raw: &str) -> String {
    let Some(start) = raw.find(FENCE) else {
        return String::new();
    };
    let body_start = start + FENCE.len();
    let Some(end) = raw[body_start..].find(FENCE) else {
        return String::new();
    };

    let block = &raw[start..body_start + end];
    let lines: Vec<&str> = block.lines().skip(1).collect();

    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_block() {
        assert_eq!(extract_code("```python\nprint(1)\n```"), "print(1)");
    }

    #[test]
    fn test_extract_without_fence_is_empty() {
        assert_eq!(extract_code("print(1)"), "");
        assert_eq!(extract_code(""), "");
    }

    #[test]
    fn test_extract_unterminated_fence_is_empty() {
        assert_eq!(extract_code("```python\nprint(1)\n"), "");
    }

    #[test]
    fn test_extract_is_one_shot() {
        let once = extract_code("Here you go:\n```python\nimport sys\nprint(sys.argv)\n```\nEnjoy!");

        assert_eq!(once, "import sys\nprint(sys.argv)");
        assert_eq!(extract_code(&once), "");
    }

    #[test]
    fn test_extract_trims_edge_blank_lines_only() {
        let raw = "```python\n\n\nimport os\n\n\ndef main():\n    pass\n\n   \n```";

        assert_eq!(extract_code(raw), "import os\n\n\ndef main():\n    pass");
    }

    #[test]
    fn test_extract_takes_first_block() {
        let raw = "```python\nfirst()\n```\ntext\n```python\nsecond()\n```";

        assert_eq!(extract_code(raw), "first()");
    }

    #[test]
    fn test_extract_handles_crlf() {
        assert_eq!(extract_code("```python\r\nprint(1)\r\n```"), "print(1)");
    }

    #[test]
    fn test_extract_empty_block() {
        assert_eq!(extract_code("```python\n```"), "");
    }
}
