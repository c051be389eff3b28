mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackforge")]
#[command(about = "ストレージと踏み台ネットワークのスタックを宣言する", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スタックをテンプレートとして出力
    Synth {
        #[command(flatten)]
        stack: StackArgs,
        /// 出力形式
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// 出力先ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// スタックのリソース一覧を表示
    List {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// バージョン情報を表示
    Version,
}

/// スタック定義の入力
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// スタックID（省略時は設定ファイルの stack_id、なければ AppStack）
    #[arg(env = "STACKFORGE_STACK_ID")]
    pub stack_id: Option<String>,
    /// スタック定義に渡す自由形式の値
    #[arg(long)]
    pub custom_prop: Option<String>,
    /// スタック設定ファイル（YAML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout はテンプレート出力に使うので、ログは stderr に出す
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Synth {
            stack,
            format,
            output,
        } => commands::synth::handle(&stack, format, output.as_deref()).await,
        Commands::List { stack } => commands::list::handle(&stack),
        Commands::Version => {
            println!("stackforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
