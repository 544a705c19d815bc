use anyhow::{bail, Context};
use btcm_sdk::{
    Block, ChainReader, Node, NodeConfig, Payload, SdkError, Transaction, ValidationReport,
};
use colored::Colorize;
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = Ctx {
        dir: cli.dir,
        format: cli.format,
    };
    match cli.command {
        Command::Init(args) => cmd_init(&ctx, args),
        Command::Transfer(args) => cmd_transfer(&ctx, args),
        Command::Pay(args) => cmd_pay(&ctx, args),
        Command::Show(args) => cmd_show(&ctx, args),
        Command::Verify => cmd_verify(&ctx),
        Command::Demo => cmd_demo(&ctx),
    }
}

struct Ctx {
    dir: std::path::PathBuf,
    format: OutputFormat,
}

impl Ctx {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn open(&self) -> anyhow::Result<Node> {
        Node::open_dir(&self.dir).map_err(|e| match e {
            SdkError::NotInitialized(_) => anyhow::anyhow!(
                "no chain in {}; run `btcm init --dir {}` first",
                self.dir.display(),
                self.dir.display()
            ),
            other => other.into(),
        })
    }
}

fn cmd_init(ctx: &Ctx, args: InitArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NodeConfig::default(),
    };
    let node = Node::init_dir(&ctx.dir, config)?;
    let genesis = node.ledger().latest()?;

    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&block_json(&node, &genesis, true)?)?);
        return Ok(());
    }
    println!(
        "{} Initialized BTC-Mobile node in {}",
        "✓".green().bold(),
        ctx.dir.display().to_string().bold()
    );
    println!("  Genesis: {}", genesis.hash.short().yellow());
    let policy = node.config().policy;
    println!(
        "  Policy: block size {} bytes, interval {}s",
        policy.max_block_size, policy.target_interval
    );
    Ok(())
}

fn cmd_transfer(ctx: &Ctx, args: TransferArgs) -> anyhow::Result<()> {
    let node = ctx.open()?;
    let block = node.transfer(args.from, args.to, args.amount)?;
    report_appended(ctx, &node, &block)
}

fn cmd_pay(ctx: &Ctx, args: PayArgs) -> anyhow::Result<()> {
    let node = ctx.open()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let block = runtime.block_on(node.settle_and_record(
        &args.from,
        &args.to,
        args.amount,
        &args.memo,
    ));
    let block = block.map_err(|e| match e {
        SdkError::Unrecorded { invoice, proof, source } => anyhow::anyhow!(
            "payment settled but not recorded: {source}\n  invoice: {invoice}\n  payment hash: {}\n  preimage: {}",
            proof.payment_hash,
            proof.preimage
        ),
        other => other.into(),
    })?;
    report_appended(ctx, &node, &block)
}

fn report_appended(ctx: &Ctx, node: &Node, block: &Block) -> anyhow::Result<()> {
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&block_json(node, block, true)?)?);
    } else {
        println!(
            "{} Appended block #{} {}",
            "✓".green().bold(),
            block.index,
            block.hash.short().yellow()
        );
    }
    Ok(())
}

fn cmd_show(ctx: &Ctx, args: ShowArgs) -> anyhow::Result<()> {
    let node = ctx.open()?;
    print_chain(ctx, &node, args.payloads)
}

fn cmd_verify(ctx: &Ctx) -> anyhow::Result<()> {
    let report = Node::audit_dir(&ctx.dir)?;
    print_report(ctx, &report)?;
    if !report.is_valid() {
        bail!("chain failed verification with {} violation(s)", report.violations.len());
    }
    Ok(())
}

/// Genesis, one valid transfer, one stale block, then the off-chain paths.
fn cmd_demo(ctx: &Ctx) -> anyhow::Result<()> {
    let node = Node::in_memory(NodeConfig::default())?;
    let ledger = node.ledger();
    let genesis = ledger.latest()?;

    let payload = ledger.payload_for(vec![Transaction::transfer("user1", "user2", 10)?]);
    let block = ledger.create_block(&payload, &genesis.hash)?;
    ledger.append(block)?;

    let stale_payload = ledger.payload_for(vec![Transaction::transfer("user2", "user1", 5)?]);
    let stale = ledger.create_block(&stale_payload, &genesis.hash)?;
    match ledger.append(stale) {
        Ok(()) => bail!("stale block was accepted"),
        Err(e) if e.is_rejection() => {
            if !ctx.json() {
                println!("{} stale block: {}", "rejected".red().bold(), e);
            }
        }
        Err(e) => return Err(e.into()),
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let proof = runtime.block_on(node.pay_off_chain(1_000, "coffee"))?;
    if !ctx.json() {
        println!(
            "{} off-chain payment, preimage {}",
            "settled".green().bold(),
            preview(&proof.preimage)
        );
    }
    runtime.block_on(node.settle_and_record("user2", "user3", 4, "rent"))?;

    print_chain(ctx, &node, true)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_chain(ctx: &Ctx, node: &Node, payloads: bool) -> anyhow::Result<()> {
    let blocks = node.blocks()?;

    if ctx.json() {
        let rendered = blocks
            .iter()
            .map(|b| block_json(node, b, payloads))
            .collect::<anyhow::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    for block in &blocks {
        println!(
            "{} {}",
            format!("Block #{}", block.index).bold(),
            block.hash.short().yellow()
        );
        println!("  previous   {}", block.previous_hash.short().dimmed());
        println!("  timestamp  {}", block.timestamp);
        println!("  payload    {}", block.payload_reference.short().cyan());
        if payloads {
            print_payload(&node.payload(block)?);
        }
    }
    println!("{} block(s)", blocks.len().to_string().bold());
    Ok(())
}

fn print_payload(payload: &Payload) {
    for tx in &payload.transactions {
        let label = if tx.is_issuance() { "issue" } else { "tx" };
        println!("  {:<10} {}", label, tx);
    }
    if let Some(settlement) = &payload.settlement {
        println!("  {:<10} {}", "settled", settlement.invoice.blue());
    }
}

fn print_report(ctx: &Ctx, report: &ValidationReport) -> anyhow::Result<()> {
    if ctx.json() {
        let violations: Vec<Value> = report
            .violations
            .iter()
            .map(|v| {
                json!({
                    "position": v.position,
                    "kind": format!("{:?}", v.kind),
                    "description": v.description,
                })
            })
            .collect();
        let rendered = json!({
            "valid": report.is_valid(),
            "blocks": report.block_count,
            "hash_chain_valid": report.hash_chain_valid,
            "indices_contiguous": report.indices_contiguous,
            "payloads_resolved": report.payloads_resolved,
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    let mark = |ok: bool| if ok { "valid".green() } else { "BROKEN".red() };
    if report.is_valid() {
        println!("{} Chain integrity verified", "✓".green().bold());
    } else {
        println!("{} Chain integrity check failed", "✗".red().bold());
    }
    println!("  Blocks: {}", report.block_count);
    println!("  Hash chain: {}", mark(report.hash_chain_valid));
    println!("  Indices: {}", mark(report.indices_contiguous));
    if let Some(resolved) = report.payloads_resolved {
        println!("  Payloads: {}", mark(resolved));
    }
    for v in &report.violations {
        println!("  {} #{} {:?}: {}", "!".red(), v.position, v.kind, v.description);
    }
    Ok(())
}

/// Leading characters of a hex string, for one-line output.
fn preview(hex: &str) -> &str {
    hex.get(..16).unwrap_or(hex)
}

fn block_json(node: &Node, block: &Block, with_payload: bool) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(block)?;
    if with_payload {
        let payload = serde_json::to_value(node.payload(block)?)?;
        if let Value::Object(map) = &mut value {
            map.insert("payload".into(), payload);
        }
    }
    Ok(value)
}
