#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::adt::{AdtError, AdtResult};

/// Only tileset textures are ever referenced by tex files; everything else
/// in the manifest is dead weight.
const PATH_PREFIX: &str = "tileset";

/// Bidirectional file-id <-> path table from the listfile manifest.
#[derive(Debug, Default)]
pub struct Listfile {
    by_id: HashMap<u32, String>,
    by_path: HashMap<String, u32>,
}

impl Listfile {
    pub fn insert(&mut self, id: u32, path: &str) {
        self.by_id.insert(id, path.to_string());
        self.by_path.insert(path.to_string(), id);
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn id(&self, path: &str) -> Option<u32> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn parse(reader: impl BufRead) -> AdtResult<Listfile> {
    let mut out = Listfile::default();
    for line in reader.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split(';').collect();
        if parts.len() != 2 {
            continue;
        }

        let path = parts[1].to_lowercase();
        if !path.starts_with(PATH_PREFIX) {
            continue;
        }

        let id: u32 = parts[0]
            .parse()
            .map_err(|_| AdtError::Listfile(format!("bad file id in line: {line}")))?;
        out.insert(id, &path);
    }
    Ok(out)
}

pub fn load_listfile(path: &Path) -> AdtResult<Listfile> {
    if !path.exists() {
        return Err(AdtError::Listfile(format!(
            "{} not found, place it next to the program",
            path.display()
        )));
    }

    let listfile = parse(BufReader::new(File::open(path)?))?;
    info!("listfile loaded, found {} tileset entries", listfile.len());
    Ok(listfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_and_filters_tileset_entries() {
        let input = "\
100;Tileset/Grass.blp\n\
101;interface/icons/something.blp\n\
garbage line\n\
102;TILESET/dirt.blp\n";
        let lf = parse(Cursor::new(input)).unwrap();
        assert_eq!(lf.len(), 2);
        assert_eq!(lf.name(100), Some("tileset/grass.blp"));
        assert_eq!(lf.id("tileset/dirt.blp"), Some(102));
        assert_eq!(lf.name(101), None);
    }

    #[test]
    fn bad_id_on_tileset_line_is_an_error() {
        let err = parse(Cursor::new("xyz;tileset/grass.blp\n")).unwrap_err();
        assert!(matches!(err, AdtError::Listfile(_)));
    }
}
