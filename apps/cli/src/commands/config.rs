//! 配置管理命令

use crate::config::CliConfig;
use anyhow::{Result, bail};
use clap::Subcommand;
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置（文件 + 命令行覆盖）
    Show,

    /// 写出默认配置文件
    Init {
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, path: &Path, effective: &CliConfig) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                println!("# {}", path.display());
                print!("{}", effective.to_toml()?);
                Ok(())
            },
            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
                }
                CliConfig::default().save(path)?;
                println!("✅ 已写入默认配置: {}", path.display());
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        ConfigCommand::Init { force: false }
            .execute(&path, &CliConfig::default())
            .unwrap();
        assert!(path.exists());

        assert!(
            ConfigCommand::Init { force: false }
                .execute(&path, &CliConfig::default())
                .is_err()
        );
        ConfigCommand::Init { force: true }
            .execute(&path, &CliConfig::default())
            .unwrap();
    }
}
