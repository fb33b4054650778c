//! 文本切分器
//!
//! 把自由文本切成适合 TTS 接口的有界片段，依次尊重段落、句号、逗号三级边界

use super::generation::Fragment;

/// 默认最大字符数
pub const DEFAULT_MAX_CHARS: usize = 250;

/// 逗号拼接时的分隔符 ", " 长度
const COMMA_JOIN_LEN: usize = 2;

/// 按 Unicode 标量计数（与接口的字符限制一致）
#[inline]
fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 末尾缺句号时补上
fn with_period(s: &str) -> String {
    if s.ends_with('.') {
        s.to_string()
    } else {
        format!("{}.", s)
    }
}

/// 按句号把段落切成句子
///
/// ". " 先折叠为 "."，之后每个句号都视为边界；每句 trim 后补回句号
fn split_sentences(paragraph: &str) -> Vec<String> {
    paragraph
        .replace(". ", ".")
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}.", s))
        .collect()
}

/// 超长句子按逗号贪心打包
///
/// 当前子片段加上 ", " 和下一部分会超过上限时，输出当前子片段（补句号）并以该部分重新开始。
/// 单个部分本身超过上限时原样输出，不再继续切分。
fn split_long_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut parts_out = Vec::new();
    let mut current = String::new();

    for part in sentence.split(',') {
        let part = part.trim();

        if char_len(&current) + char_len(part) + COMMA_JOIN_LEN <= max_chars {
            let joined = if current.is_empty() {
                part.to_string()
            } else {
                format!("{}, {}", current, part)
            };
            current = joined.trim_matches(|c| c == ',' || c == ' ').to_string();
        } else {
            if !current.is_empty() {
                parts_out.push(with_period(&current));
            }
            current = part.to_string();
        }
    }

    if !current.is_empty() {
        parts_out.push(with_period(&current));
    }

    parts_out
}

/// 句子追加到缓冲区后的长度（含连接空格）
fn joined_len(buffer: &str, sentence: &str) -> usize {
    if buffer.is_empty() {
        char_len(sentence)
    } else {
        char_len(buffer) + 1 + char_len(sentence)
    }
}

fn flush(buffer: &mut String, fragments: &mut Vec<String>) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
    buffer.clear();
}

/// 切分文本
///
/// 切分策略：
/// 1. 按换行切成段落，丢弃空白行，段落之间互不合并
/// 2. 段落长度不超过 `max_chars` 时整段输出
/// 3. 否则按句号切句，短句在缓冲区内用空格拼接，放不下时先输出缓冲区
/// 4. 单句超过 `max_chars` 时按逗号切分（先输出已缓冲的句子，保持原文顺序）
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    let mut buffer = String::new();

    let paragraphs = text.split('\n').map(str::trim).filter(|p| !p.is_empty());

    for paragraph in paragraphs {
        if char_len(paragraph) <= max_chars {
            fragments.push(paragraph.to_string());
            continue;
        }

        for sentence in split_sentences(paragraph) {
            if char_len(&sentence) > max_chars {
                flush(&mut buffer, &mut fragments);
                fragments.extend(split_long_sentence(&sentence, max_chars));
            } else if joined_len(&buffer, &sentence) > max_chars {
                flush(&mut buffer, &mut fragments);
                buffer = sentence;
            } else {
                if !buffer.is_empty() {
                    buffer.push(' ');
                }
                buffer.push_str(&sentence);
            }
        }

        flush(&mut buffer, &mut fragments);
    }

    flush(&mut buffer, &mut fragments);
    fragments
}

/// 切分文本并分配从 1 开始的位置
pub fn fragment_text(text: &str, max_chars: usize) -> Vec<Fragment> {
    split_text(text, max_chars)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Fragment::new(i as u32 + 1, text))
        .collect()
}
