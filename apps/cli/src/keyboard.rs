//! 键盘遥控终端（rustyline 行输入）

use n9_driver::{Pose, TeleopConsole};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

pub struct ReadlineConsole {
    editor: DefaultEditor,
}

impl ReadlineConsole {
    pub fn new() -> anyhow::Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }
}

impl TeleopConsole for ReadlineConsole {
    fn read_key(&mut self) -> Option<String> {
        match self.editor.readline("n9-keyb> ") {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Some(line)
            },
            // Ctrl-C / Ctrl-D 退出遥控模式
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                None
            },
        }
    }

    fn show_position(&mut self, pose: &Pose) {
        for (axis, count) in pose.iter().filter(|(_, count)| *count != 0) {
            println!("  {:<10} {}", axis.name(), count);
        }
    }

    fn show_message(&mut self, message: &str) {
        println!("{}", message);
    }
}
