//! 下行字节流的行分帧
//!
//! 串口到达的数据是任意切分的字节块，一条完整的行可能跨越多个块。
//! [`LineDecoder`] 在会话期间累积未完成的行，保证分块方式对输出不可见。

/// 行分帧解码器
///
/// 每个连接会话持有一个实例；会话结束时随读取线程一起丢弃，
/// 因此重连之间的残留半行数据会被丢弃（与原有行为一致，见仓库文档）。
///
/// 解码约定：
/// - 行以 LF（`\n`）结尾，结尾符被剥离；
/// - 每行按 UTF-8 尽力解码（非法序列替换为 U+FFFD，永不报错）；
/// - 行两端空白（含 CR）被剥离，仅含空白的行被丢弃；
/// - 最后一个 LF 之后的数据保留在缓冲区，与下一块拼接。
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(256),
        }
    }

    /// 送入一块字节，返回其中完成的所有行
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            // 剥离结尾符后按 UTF-8 尽力解码
            let text = String::from_utf8_lossy(&raw[..pos]);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    }

    /// 丢弃缓冲区中的半行数据
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// 当前缓冲的未完成字节数
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
