use anyhow::{bail, Result};
use ron::de::from_reader;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fmt::Write;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
enum Contents {
    Byte,
    Word,
    WordBigEndian,
    Word32,
    Magic,
}

impl Contents {
    fn size(&self) -> usize {
        match self {
            Contents::Byte => 1,
            Contents::Word | Contents::WordBigEndian => 2,
            Contents::Word32 => 4,
            Contents::Magic => 8,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Field(usize, String, Contents);

#[derive(Debug, Deserialize)]
struct Layout {
    size: usize,
    fields: Vec<Field>,
}

fn validate(layout: &Layout) -> Result<()> {
    let mut names = HashSet::new();
    let mut seen = 0;

    for Field(offset, name, contents) in &layout.fields {
        if !names.insert(name.as_str()) {
            bail!("duplicate field {}", name);
        }

        if *offset < seen {
            bail!("field {} at 0x{:x} overlaps its predecessor", name, offset);
        }

        seen = offset + contents.size();

        if seen > layout.size {
            bail!("field {} runs past the end of the block", name);
        }
    }

    Ok(())
}

fn output_fields(layout: &Layout) -> Result<String> {
    let mut s = String::new();

    writeln!(&mut s, "pub const BLOCK_SIZE: usize = {};", layout.size)?;

    for Field(offset, name, contents) in &layout.fields {
        writeln!(
            &mut s,
            r##"
pub const {}: Field<'static> = Field {{
    name: "{}",
    offset: 0x{:x},
    contents: Contents::{:?},
}};"##,
            name, name, offset, contents
        )?;
    }

    write!(
        &mut s,
        r##"
pub fn fields() -> &'static [Field<'static>] {{
    &["##
    )?;

    for Field(_, name, _) in &layout.fields {
        write!(&mut s, "{}, ", name)?;
    }

    writeln!(&mut s, "]\n}}")?;

    Ok(s)
}

fn codegen() -> Result<()> {
    use std::io::Write;

    let mut dir = PathBuf::from(&env::var("CARGO_MANIFEST_DIR")?);
    dir.push("src");
    dir.push("layout.ron");

    let f = match File::open(dir) {
        Ok(f) => f,
        Err(e) => {
            bail!("failed to open layout.ron: {}", e);
        }
    };

    let layout: Layout = match from_reader(f) {
        Ok(layout) => layout,
        Err(e) => {
            bail!("failed to parse layout.ron: {}", e);
        }
    };

    validate(&layout)?;

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("fields.rs");
    let mut file = File::create(&dest_path)?;
    let out = output_fields(&layout)?;

    file.write_all(out.as_bytes())?;

    Ok(())
}

fn main() {
    if let Err(e) = codegen() {
        println!("code generation failed: {}", e);
        std::process::exit(1);
    }

    println!("cargo:rerun-if-changed=src/layout.ron");
    println!("cargo:rerun-if-changed=build.rs");
}
