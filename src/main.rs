//! Nano Client - Main Application
//!
//! Command line front end for key derivation, address conversion, amount and
//! difficulty conversion, and proof-of-work generation.

use nano_client::{
    config::{AddressCommand, AmountCommand, Command, Config, DifficultyCommand, KeyCommand, LogFormat, WorkCommand},
    deterministic_key, generate_mnemonic,
    keys::parse_language,
    mnemonic_key,
    utils::hex_to_array,
    work::work_value,
    BlockHash, Error, KeyPair, Network, PublicKey, Result, SearchOutcome, SecretKey, StateBlock,
    Work, WorkEngine, APP_NAME, APP_VERSION,
};

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level().to_string()));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load and validate configuration
    let config = Config::load().await?;
    init_tracing(&config);

    debug!("{} v{}", APP_NAME, APP_VERSION);
    let output = run(&config).await?;
    println!("{}", output);

    Ok(())
}

/// Execute the selected command, returning what should be printed
async fn run(config: &Config) -> Result<String> {
    let network = config.network()?;

    match &config.command {
        Command::Key(command) => {
            let secret = match command {
                KeyCommand::Deterministic { seed, index } => {
                    deterministic_key(&hex_to_array::<32>(seed, "seed")?, *index)
                }
                KeyCommand::Mnemonic {
                    words,
                    index,
                    passphrase,
                    language,
                } => mnemonic_key(words, *index, passphrase, parse_language(language)?)?,
            };
            Ok(describe_keys(&KeyPair::from_secret(secret, &network)))
        }

        Command::Mnemonic { strength, language } => {
            generate_mnemonic(*strength, parse_language(language)?)
        }

        Command::Address(command) => match command {
            AddressCommand::Encode { public_key } => {
                Ok(network.encode_address(&public_key.parse::<PublicKey>()?))
            }
            AddressCommand::Decode { address } => Ok(network.decode_address(address)?.to_hex()),
            AddressCommand::FromSecret { secret } => {
                let keys = KeyPair::from_secret(secret.parse::<SecretKey>()?, &network);
                Ok(describe_keys(&keys))
            }
        },

        Command::Work(command) => run_work(command, config, &network).await,

        Command::Difficulty(command) => match command {
            DifficultyCommand::FromMultiplier { multiplier } => {
                Ok(network.from_multiplier(*multiplier)?.to_hex())
            }
            DifficultyCommand::ToMultiplier { difficulty } => {
                Ok(network.to_multiplier(*difficulty).to_string())
            }
        },

        Command::Amount(command) => match command {
            AmountCommand::ToRaw { value, exponent } => {
                let raw = match exponent {
                    Some(exponent) => network.to_raw_with(value, *exponent)?,
                    None => network.to_raw(value)?,
                };
                Ok(raw.to_string())
            }
            AmountCommand::FromRaw { raw, exponent } => match exponent {
                Some(exponent) => network.from_raw_with(*raw, *exponent),
                None => Ok(network.from_raw(*raw)),
            },
        },

        Command::Block { json } => {
            let json = if json == "-" {
                let mut buffer = String::new();
                tokio::io::stdin().read_to_string(&mut buffer).await?;
                buffer
            } else {
                json.clone()
            };
            Ok(describe_block(&StateBlock::from_json(&json, &network)?, &network))
        }

        Command::Config => print_configuration(config),
    }
}

async fn run_work(command: &WorkCommand, config: &Config, network: &Network) -> Result<String> {
    match command {
        WorkCommand::Generate {
            root,
            threshold,
            timeout,
        } => {
            let root: BlockHash = root.parse()?;
            let difficulty = threshold.resolve(network)?;
            let engine = WorkEngine::with_threads(config.threads());
            info!(
                "Generating work with {} search, difficulty {} ({:.3}x base)",
                engine.strategy_name(),
                difficulty,
                network.to_multiplier(difficulty)
            );

            let cancel = CancellationToken::new();
            let interrupt = spawn_cancel_on_interrupt(cancel.clone());

            let outcome = match timeout {
                Some(timeout) => engine.generate_until(root, difficulty, cancel, *timeout).await,
                None => engine.generate(root, difficulty, cancel).await,
            };
            interrupt.abort();

            match outcome? {
                SearchOutcome::Found(work) => Ok(describe_work(work, &root, network)),
                SearchOutcome::Cancelled => Err(Error::invalid_state(
                    "work generation cancelled before a valid value was found",
                )),
            }
        }

        WorkCommand::Validate {
            work,
            root,
            threshold,
        } => {
            let work: Work = work.parse()?;
            let root: BlockHash = root.parse()?;
            let difficulty = threshold.resolve(network)?;
            let valid = nano_client::work::validate(work, &root, difficulty);
            Ok(format!(
                "valid:      {}\n{}",
                valid,
                describe_work(work, &root, network)
            ))
        }
    }
}

/// Cancel `cancel` on Ctrl-C
fn spawn_cancel_on_interrupt(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping work search");
            cancel.cancel();
        }
    })
}

fn describe_keys(keys: &KeyPair) -> String {
    let mut lines = Vec::new();
    if let Some(secret) = keys.secret() {
        lines.push(format!("secret:  {}", secret.to_hex()));
    }
    lines.push(format!("public:  {}", keys.public_key()));
    lines.push(format!("address: {}", keys.address()));
    lines.join("\n")
}

fn describe_work(work: Work, root: &BlockHash, network: &Network) -> String {
    let value = work_value(work, root);
    format!(
        "work:       {}\nvalue:      {:016x}\nmultiplier: {}",
        work,
        value,
        network.to_multiplier(nano_client::Difficulty::new(value))
    )
}

fn describe_block(block: &StateBlock, network: &Network) -> String {
    let mut lines = vec![
        format!("hash:           {}", block.digest()),
        format!("account:        {}", network.encode_address(block.account())),
        format!("representative: {}", network.encode_address(block.representative())),
        format!("balance:        {}", network.from_raw(block.balance())),
        format!("signature ok:   {}", block.verify_signature()),
    ];
    match block.work() {
        Some(work) => {
            lines.push(format!(
                "work ok:        send={} receive={}",
                block.validate_work(network.send_difficulty()),
                block.validate_work(network.receive_difficulty())
            ));
            lines.push(describe_work(work, block.work_root(), network));
        }
        None => lines.push("work:           none".to_string()),
    }
    lines.join("\n")
}

/// Print the effective configuration as YAML
fn print_configuration(config: &Config) -> Result<String> {
    let config_yaml = serde_yaml::to_string(&config.effective()?)?;
    Ok(config_yaml.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    async fn run_args(args: &[&str]) -> Result<String> {
        let mut argv = vec!["nano-client"];
        argv.extend_from_slice(args);
        let config = Config::try_parse_from(argv).unwrap().with_file().await?;
        run(&config).await
    }

    #[tokio::test]
    async fn test_deterministic_key_command() {
        let output = run_args(&["key", "deterministic", &"0".repeat(64)]).await.unwrap();
        assert!(output
            .contains("secret:  9f0e444c69f77a49bd0be89db92c38fe713e0963165cca12faf5712d7657120f"));
        assert!(output.contains("address: nano_"));

        assert!(run_args(&["key", "deterministic", "abcd"]).await.is_err());
    }

    #[tokio::test]
    async fn test_address_commands() {
        let zero_address = "nano_1111111111111111111111111111111111111111111111111111hifc8npp";
        let output = run_args(&["address", "encode", &"0".repeat(64)]).await.unwrap();
        assert_eq!(output, zero_address);

        let output = run_args(&["address", "decode", zero_address]).await.unwrap();
        assert_eq!(output, "0".repeat(64));

        let output = run_args(&["address", "from-secret", &"0".repeat(64)]).await.unwrap();
        assert!(output
            .ends_with("address: nano_18gmu6engqhgtjnppqam181o5nfhj4sdtgyhy36dan3jr9spt84rzwmktafc"));

        let output = run_args(&["--prefix", "xrb_", "address", "encode", &"0".repeat(64)])
            .await
            .unwrap();
        assert!(output.starts_with("xrb_"));
    }

    #[tokio::test]
    async fn test_conversion_commands() {
        assert_eq!(
            run_args(&["difficulty", "from-multiplier", "8"]).await.unwrap(),
            "fffffff800000000"
        );
        assert_eq!(
            run_args(&["difficulty", "to-multiplier", "fffffe0000000000"]).await.unwrap(),
            "0.125"
        );
        assert_eq!(
            run_args(&["amount", "to-raw", "1.5"]).await.unwrap(),
            "1500000000000000000000000000000"
        );
        assert_eq!(
            run_args(&["amount", "from-raw", "1500", "--exponent", "3"]).await.unwrap(),
            "1.500"
        );
    }

    #[tokio::test]
    async fn test_work_commands() {
        let root = "11".repeat(32);
        let output = run_args(&["work", "generate", &root, "-d", "ff00000000000000"])
            .await
            .unwrap();
        let work = output.lines().next().unwrap().trim_start_matches("work:").trim();

        let output = run_args(&["work", "validate", work, &root, "-d", "ff00000000000000"])
            .await
            .unwrap();
        assert!(output.starts_with("valid:      true"));

        let output = run_args(&[
            "work", "validate", "e1c6427755027448", &"0".repeat(64), "--kind", "send",
        ])
        .await
        .unwrap();
        assert!(output.starts_with("valid:      false"));
    }

    #[tokio::test]
    async fn test_work_generate_times_out() {
        let result = run_args(&[
            "--threads", "1", "work", "generate", &"0".repeat(64),
            "-d", "ffffffffffffffff", "--timeout", "100ms",
        ])
        .await;
        assert!(matches!(result, Err(Error::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_block_command() {
        let network = Network::nano();
        let keys = KeyPair::from_secret(SecretKey::new([0u8; 32]), &network);
        let mut block = StateBlock::new(
            *keys.public_key(),
            *keys.public_key(),
            0,
            BlockHash::ZERO,
            nano_client::Link::ZERO,
        );
        block.sign(&keys).unwrap();
        let json = block.to_json(&network).unwrap();

        let output = run_args(&["block", &json]).await.unwrap();
        assert!(output.contains(
            "hash:           1f5bc8e8c4b862fdc5d01857325dade3561349505f4a4d478610e3394d2105f3"
        ));
        assert!(output.contains("signature ok:   true"));
        assert!(output.contains("work:           none"));
    }

    #[tokio::test]
    async fn test_config_printing() {
        let output = run_args(&["--threads", "2", "config"]).await.unwrap();
        assert!(output.contains("threads: 2"));
    }
}
