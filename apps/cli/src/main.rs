//! # N9 CLI
//!
//! Command-line interface for the N9 robot arm.
//!
//! 每次调用都是一次完整会话：加载配置 -> 连接（失败则离线）-> 执行命令 -> 断开。
//!
//! ```bash
//! # 写出默认配置，然后修改串口
//! n9-cli config init
//!
//! # 查询位置
//! n9-cli --port /dev/ttyUSB0 position
//!
//! # 不连接硬件，演练一次 goto
//! n9-cli --offline goto x=-100 y=250 --order sez
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod keyboard;
mod safety;

use commands::{ConfigCommand, ExecCommand, GotoCommand, OutputCommand, SpinCommand};
use config::CliConfig;
use keyboard::ReadlineConsole;
use n9_client::{Robot, forward_kinematics};
use n9_driver::Session;
use n9_protocol::AxisId;
use n9_serial::SerialPortConnector;
use safety::{PromptConfirmer, install_interrupt_handler};

/// N9 CLI - 机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "n9-cli")]
#[command(about = "Command-line interface for N9 robot arm control", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// 串口（覆盖配置文件）
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// 离线模式：不打开串口，命令只记录日志
    #[arg(long, global = true)]
    offline: bool,

    /// 连接后不回零
    #[arg(long, global = true)]
    no_home: bool,

    /// 单步模式：每条命令执行后确认
    #[arg(long, global = true)]
    step: bool,

    /// 断开前不执行粗回零
    #[arg(long, global = true)]
    no_rough_home: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询当前位置
    Position,

    /// 回零
    Home,

    /// 移动到目标位置
    Goto {
        #[command(flatten)]
        args: GotoCommand,
    },

    /// 按名称执行一条控制器命令
    Exec {
        #[command(flatten)]
        args: ExecCommand,
    },

    /// 键盘遥控
    Keyboard,

    /// 通信自检（echo / random / plustwo）
    Test {
        /// 重复次数
        #[arg(short, long, default_value_t = 1)]
        repeats: usize,
    },

    /// 设置输出
    Output {
        #[command(flatten)]
        args: OutputCommand,
    },

    /// 夹爪轴持续旋转
    Spin {
        #[command(flatten)]
        args: SpinCommand,
    },
}

impl Cli {
    fn config_path(&self) -> Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => config::default_path(),
        }
    }

    /// 命令行参数覆盖配置文件
    fn apply_overrides(&self, config: &mut CliConfig) {
        if let Some(port) = &self.port {
            config.session.port = port.clone();
        }
        if self.offline {
            config.session.offline = true;
        }
        if self.no_home {
            config.session.home_on_connect = false;
        }
        if self.step {
            config.session.step_cycle = true;
        }
    }
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("n9_cli=info,n9_driver=info,n9_client=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    let path = cli.config_path()?;
    let mut config = CliConfig::load(&path)?;
    cli.apply_overrides(&mut config);

    let Cli {
        command,
        no_rough_home,
        ..
    } = cli;

    if let Commands::Config(cmd) = command {
        return cmd.execute(&path, &config);
    }

    let connector = SerialPortConnector::new(config.session.port_settings());
    let step_cycle = config.session.step_cycle;
    let mut session = Session::open(config.session, connector)?;
    install_interrupt_handler(session.cancel_token())?;
    if step_cycle {
        session.set_confirmer(PromptConfirmer);
    }
    tracing::info!("Session state: {}", session.state().description());

    let mut robot: Robot<String> = Robot::new(session, config.robot);
    let outcome = run(&mut robot, command);

    // 无论命令成败都断开（先粗回零）
    let closed = robot.disconnect(!no_rough_home);
    if let Err(e) = &outcome {
        if is_cancelled(e) {
            eprintln!("⚠️  操作已中断，机械臂已回零");
        }
    }
    outcome?;
    closed?;
    Ok(())
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<n9_client::ClientError>()
        .is_some_and(|e| e.is_cancelled())
}

fn run(robot: &mut Robot<String>, command: Commands) -> Result<()> {
    match command {
        Commands::Position => {
            let pose = robot.position()?;
            let geometry = &robot.params().geometry;
            let point = forward_kinematics(
                geometry,
                pose.count(AxisId::Shoulder),
                pose.count(AxisId::Elbow),
            );
            println!("{}", pose);
            println!("xy: {}", point);
            Ok(())
        },
        Commands::Home => {
            println!("{}", robot.home()?);
            Ok(())
        },
        Commands::Goto { args } => args.execute(robot),
        Commands::Exec { args } => args.execute(robot),
        Commands::Keyboard => {
            let mut console = ReadlineConsole::new()?;
            robot.keyboard(&mut console)?;
            Ok(())
        },
        Commands::Test { repeats } => {
            for response in robot.self_test(repeats)? {
                println!("{}", response);
            }
            Ok(())
        },
        Commands::Output { args } => args.execute(robot),
        Commands::Spin { args } => args.execute(robot),
        // 在打开会话前已处理
        Commands::Config(_) => Ok(()),
    }
}
