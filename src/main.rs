//! Merkle Campaign CLI
//!
//! Builds a payout commitment and walks a campaign through its lifecycle,
//! printing the transaction draft for every accepted operation.
//!
//! Usage: `merkle-campaign [payouts.json]`, where the file holds a JSON array
//! of `{"address": ..., "amount": ...}` objects.

use std::path::Path;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use merkle_campaign::{
    generate_distribution, Blake2b256, CampaignRegistry, DeployConfig, DraftAssembler, HashChoice, HashPrimitive,
    Operation, PayoutEntry, Receipt, Sha256, TransactionAssembler, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Merkle Campaign v{}", VERSION);

    let config = DeployConfig::from_env();
    let payouts = match std::env::args().nth(1) {
        Some(path) => load_payouts(Path::new(&path))?,
        None => demo_payouts(),
    };

    info!(
        campaign_id = %config.campaign_id,
        hash = %config.hash,
        participants = payouts.len(),
        "configuration loaded"
    );

    match config.hash {
        HashChoice::Blake2b => run::<Blake2b256>(&config, &payouts).await,
        HashChoice::Sha256 => run::<Sha256>(&config, &payouts).await,
    }
}

fn load_payouts(path: &Path) -> anyhow::Result<Vec<PayoutEntry>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let payouts: Vec<PayoutEntry> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    if payouts.is_empty() {
        bail!("{} contains no payouts", path.display());
    }
    Ok(payouts)
}

fn demo_payouts() -> Vec<PayoutEntry> {
    vec![
        PayoutEntry::new("addr_test1_alice", 50_000_000),
        PayoutEntry::new("addr_test1_bob", 30_000_000),
        PayoutEntry::new("addr_test1_carol", 20_000_000),
    ]
}

/// Demo lifecycle: deposit, seal, every participant claims, one replay.
async fn run<H: HashPrimitive>(config: &DeployConfig, payouts: &[PayoutEntry]) -> anyhow::Result<()> {
    info!("=== Building Payout Tree ===");

    let distribution = generate_distribution::<H>(payouts, &config.campaign_id)?;
    info!(
        root = %distribution.root,
        leaves = distribution.tree.leaf_count(),
        depth = distribution.tree.depth(),
        "payout tree built"
    );
    println!("{}", serde_json::to_string_pretty(&distribution.proofs)?);

    let pool = payouts
        .iter()
        .try_fold(0u64, |total, entry| total.checked_add(entry.amount))
        .context("payout total overflows u64")?;

    info!("=== Running Campaign ===");

    let registry = CampaignRegistry::<H>::new();
    let assembler = DraftAssembler::new(format!("script_{}", config.campaign_id));

    let params = config.deposit_params(pool);
    let receipt = registry.deposit(&config.owner, params.clone()).await?;
    print_draft(&assembler, &Operation::Deposit(params), &receipt)?;

    let set_root = Operation::SetRoot {
        root: distribution.root.as_bytes().to_vec(),
    };
    let mut receipt = registry
        .submit(&config.campaign_id, &config.owner, &set_root, receipt.version)
        .await?;
    print_draft(&assembler, &set_root, &receipt)?;

    for (address, bundle) in &distribution.proofs {
        let claim = Operation::claim(address.clone(), bundle.amount, bundle.proof.clone());
        receipt = registry
            .submit(&config.campaign_id, address, &claim, receipt.version)
            .await?;
        print_draft(&assembler, &claim, &receipt)?;
    }

    // A replayed claim must be refused
    if let Some((address, bundle)) = distribution.proofs.iter().next() {
        let replay = Operation::claim(address.clone(), bundle.amount, bundle.proof.clone());
        match registry
            .submit(&config.campaign_id, address, &replay, receipt.version)
            .await
        {
            Ok(_) => bail!("replayed claim for {} was accepted", address),
            Err(err) => warn!(address = %address, error = %err, "replayed claim refused"),
        }
    }

    info!(
        total_claimed = receipt.state.total_claimed,
        claims_count = receipt.state.claims_count,
        remaining = receipt.state.remaining_pool(),
        "=== Campaign Complete ==="
    );
    println!("{}", receipt.state.to_json()?);

    Ok(())
}

fn print_draft(assembler: &DraftAssembler, op: &Operation, receipt: &Receipt) -> anyhow::Result<()> {
    let draft = assembler.assemble(op, &receipt.state, &receipt.movements)?;
    info!(operation = %draft.operation, version = receipt.version, outputs = draft.outputs.len(), "draft assembled");
    println!("{}", draft.to_json()?);
    Ok(())
}
