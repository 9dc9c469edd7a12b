//! A payment receiver checks that a transfer is committed to by a published
//! merkle root, given only that root, the block and its sibling path.

use anyhow::{ensure, Context, Result};
use mkltree::hash::Sha256Algorithm;
use mkltree::merkle::{BuildConfig, MerkleTree};
use mkltree::proof::{verify, SiblingPath};
use mkltree::render::Encoding;

fn main() -> Result<()> {
    let blocks = ["coin_0: A->B", "coin_1: B->C", "coin_2: B->D"];

    let tree = MerkleTree::with_config(
        blocks,
        BuildConfig::default().retain_blocks(true),
        &mut Sha256Algorithm::new(),
    );

    println!("{}", tree);
    println!("{}", tree.render(Encoding::RawBytes));

    // Published, trusted by everybody.
    let root = *tree.root().context("no blocks, no root")?;

    // Sender B hands receiver C the block, its index and the path, as bytes.
    let index = 1;
    let block = blocks[index].as_bytes();
    let wire = tree
        .gen_path(index)
        .with_context(|| format!("no path for leaf {}", index))?
        .to_raw_parts();

    // Receiver C, who has never seen the tree.
    let path = SiblingPath::from_raw_parts(&wire).context("malformed path")?;
    let mut hasher = Sha256Algorithm::new();

    let exists = verify(block, index, &root, &path, &mut hasher);
    println!(
        "Block '{}' is in leaf {} of the merkle tree: {}",
        blocks[index], index, exists
    );
    ensure!(exists, "genuine block rejected");

    // One extra space is enough to be caught.
    let fake = format!("{} ", blocks[index]);
    let exists = verify(fake.as_bytes(), index, &root, &path, &mut hasher);
    println!(
        "Block '{}' is in leaf {} of the merkle tree: {}",
        fake, index, exists
    );
    ensure!(!exists, "forged block accepted");

    Ok(())
}
