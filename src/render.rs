//! Text dumps of a tree for display and debugging.
//!
//! Rendering only reads digests already stored in the tree and never sees a
//! hashing algorithm, so printing a tree cannot change what it proves.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::hash::Element;
use crate::merkle::MerkleTree;

/// How bytes are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Standard padded base64, the [`fmt::Display`] default.
    Base64,
    /// Lowercase hex.
    Hex,
    /// Decimal byte values, `[99 111 105 110]`.
    RawBytes,
}

impl Encoding {
    fn name(self) -> &'static str {
        match self {
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
            Encoding::RawBytes => "raw bytes",
        }
    }

    fn write(self, f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
        match self {
            Encoding::Base64 => f.write_str(&STANDARD.encode(bytes)),
            Encoding::Hex => f.write_str(&hex::encode(bytes)),
            Encoding::RawBytes => {
                f.write_str("[")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", b)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// [`fmt::Display`] adapter returned by [`MerkleTree::render`].
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a, T: Element> {
    tree: &'a MerkleTree<T>,
    encoding: Encoding,
}

impl<'a, T: Element> Rendered<'a, T> {
    fn write_line<B: AsRef<[u8]>>(&self, f: &mut fmt::Formatter<'_>, items: &[B]) -> fmt::Result {
        for item in items {
            f.write_str("  ")?;
            self.encoding.write(f, item.as_ref())?;
            f.write_str(",")?;
        }
        f.write_str("\n")
    }
}

impl<'a, T: Element> fmt::Display for Rendered<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.encoding.name();

        if let Some(blocks) = self.tree.blocks().filter(|blocks| !blocks.is_empty()) {
            writeln!(
                f,
                "Original blocks, encoded by {}, separated by comma:",
                name
            )?;
            self.write_line(f, blocks)?;
        }

        writeln!(
            f,
            "Merkle tree bottom-up. Leafs first, root last. Each level in one line. \
             Encoded by {}, separated by comma:",
            name
        )?;
        for level in self.tree.levels() {
            self.write_line(f, level)?;
        }
        Ok(())
    }
}

impl<T: Element> MerkleTree<T> {
    /// Returns a printable view of the retained blocks (if any) and of every
    /// level, leafs first, root last.
    pub fn render(&self, encoding: Encoding) -> Rendered<'_, T> {
        Rendered {
            tree: self,
            encoding,
        }
    }
}

/// Base64 dump, same as `render(Encoding::Base64)`.
impl<T: Element> fmt::Display for MerkleTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.render(Encoding::Base64), f)
    }
}
