use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vault-gateway", version, about = "多协议交易组合网关")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 vault-gateway.toml 或 config/vault-gateway.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 构建并 finalize 操作列表，输出每笔交易的摘要
    Plan(PlanCmd),
    /// 构建、finalize 并按顺序提交
    Submit(SubmitCmd),
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
pub struct PlanCmd {
    #[arg(value_name = "OPERATIONS", help = "操作列表 TOML 文件")]
    pub operations: PathBuf,
    #[arg(long, help = "付款人公钥；缺省时使用配置中的钱包")]
    pub payer: Option<String>,
}

#[derive(Args, Debug)]
pub struct SubmitCmd {
    #[arg(value_name = "OPERATIONS", help = "操作列表 TOML 文件")]
    pub operations: PathBuf,
    #[arg(long, help = "只签名不发送（覆盖配置中的 lander.dry_run）")]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct InitCmd {
    #[arg(
        long,
        value_name = "FILE",
        help = "输出路径（默认当前目录下的 vault-gateway.toml）"
    )]
    pub output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}
