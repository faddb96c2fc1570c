//! Minimal ROOT writer for building test inputs.
//!
//! Produces small-seek files holding `TH1D`/`TH1F` histograms (with axis
//! titles, bin labels and optional sumw2) in the top directory or in one
//! level of subdirectories, optionally zlib-compressed.

use std::collections::HashMap;
use std::path::Path;

use crate::decompress::zlib_block;
use crate::rbuffer::{BYTE_COUNT_MASK, CLASS_MASK, NEW_CLASS_TAG};

const BEGIN: usize = 100;
const FILE_NAME: &str = "fixture.root";
const TOBJECT_BITS: u32 = 0x0300_0000;

/// Precision of the stored bin contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureStorage {
    /// `TH1D`.
    Double,
    /// `TH1F`.
    Float,
}

/// A histogram to be written.
#[derive(Debug, Clone)]
pub struct FixtureHist {
    /// Object name (replaced by the last path component when added).
    pub name: String,
    /// Object title.
    pub title: String,
    /// X axis title.
    pub x_title: String,
    /// Lower axis edge.
    pub x_min: f64,
    /// Upper axis edge.
    pub x_max: f64,
    /// Bin contents without under/overflow.
    pub contents: Vec<f64>,
    /// Per-bin labels; empty strings are not written.
    pub labels: Vec<String>,
    /// Sum of squared weights per bin.
    pub sumw2: Option<Vec<f64>>,
    /// `fEntries`.
    pub entries: f64,
    /// Content precision.
    pub storage: FixtureStorage,
}

impl FixtureHist {
    /// Unit-width bins starting at 0.
    pub fn new(name: &str, contents: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            x_title: String::new(),
            x_min: 0.0,
            x_max: contents.len() as f64,
            contents: contents.to_vec(),
            labels: Vec::new(),
            sumw2: None,
            entries: contents.iter().sum(),
            storage: FixtureStorage::Double,
        }
    }

    /// Attach bin labels.
    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the X axis title.
    pub fn with_x_title(mut self, title: &str) -> Self {
        self.x_title = title.to_string();
        self
    }

    /// Store sumw2.
    pub fn with_sumw2(mut self, sumw2: &[f64]) -> Self {
        self.sumw2 = Some(sumw2.to_vec());
        self
    }

    /// Write as `TH1F`.
    pub fn as_float(mut self) -> Self {
        self.storage = FixtureStorage::Float;
        self
    }

    fn class_name(&self) -> &'static str {
        match self.storage {
            FixtureStorage::Double => "TH1D",
            FixtureStorage::Float => "TH1F",
        }
    }
}

#[derive(Debug, Clone)]
enum Item {
    Hist(FixtureHist),
    Note { name: String, text: String },
}

impl Item {
    fn name(&self) -> &str {
        match self {
            Item::Hist(h) => &h.name,
            Item::Note { name, .. } => name,
        }
    }

    fn class_name(&self) -> &'static str {
        match self {
            Item::Hist(h) => h.class_name(),
            Item::Note { .. } => "TObjString",
        }
    }

    fn title(&self) -> &str {
        match self {
            Item::Hist(h) => &h.title,
            Item::Note { .. } => "Collectable string class",
        }
    }

    fn encode(&self) -> Vec<u8> {
        let mut w = WBuffer::default();
        match self {
            Item::Hist(h) => w.th1(h),
            Item::Note { text, .. } => w.objstring(0, text),
        }
        w.buf
    }
}

/// Builder for a ROOT file.
#[derive(Debug, Clone, Default)]
pub struct FixtureFile {
    compress: bool,
    top: Vec<Item>,
    dirs: Vec<(String, Vec<Item>)>,
}

impl FixtureFile {
    /// Empty, uncompressed file.
    pub fn new() -> Self {
        Self::default()
    }

    /// zlib-compress object payloads.
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    /// Add a histogram at `path` (`"name"` or `"dir/name"`).
    pub fn histogram(mut self, path: &str, mut hist: FixtureHist) -> Self {
        let (dir, name) = split(path);
        hist.name = name.to_string();
        self.slot(dir).push(Item::Hist(hist));
        self
    }

    /// Add a `TObjString` at `path`.
    pub fn note(mut self, path: &str, text: &str) -> Self {
        let (dir, name) = split(path);
        self.slot(dir).push(Item::Note { name: name.to_string(), text: text.to_string() });
        self
    }

    /// Add an empty directory.
    pub fn directory(mut self, name: &str) -> Self {
        self.slot(Some(name));
        self
    }

    fn slot(&mut self, dir: Option<&str>) -> &mut Vec<Item> {
        let Some(dir) = dir else {
            return &mut self.top;
        };
        let idx = match self.dirs.iter().position(|(d, _)| d == dir) {
            Some(i) => i,
            None => {
                self.dirs.push((dir.to_string(), Vec::new()));
                self.dirs.len() - 1
            }
        };
        &mut self.dirs[idx].1
    }

    /// Serialize the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; BEGIN];

        // TFile record: key, name/title, top directory.
        let names = [tstring(FILE_NAME), tstring("")].concat();
        let top_dir = dir_record(BEGIN as u32, 0);
        let body_len = names.len() + top_dir.len();
        let key = encode_key("TFile", FILE_NAME, "", body_len, body_len, BEGIN, 0);
        let nbytes_name = key.len() + names.len();
        out.extend(key);
        out.extend(names);
        let top_dir_at = out.len();
        out.extend(top_dir);

        let mut top_keys = Vec::new();
        for item in &self.top {
            top_keys.push(self.write_item(&mut out, item, BEGIN));
        }
        for (name, items) in &self.dirs {
            let dir_at = out.len();
            let record = dir_record(dir_at as u32, BEGIN as u32);
            let len = record.len();
            let key = encode_key("TDirectoryFile", name, name, len, len, dir_at, BEGIN);
            let record_at = dir_at + key.len();
            out.extend_from_slice(&key);
            out.extend(record);
            top_keys.push(key);

            let keys: Vec<Vec<u8>> =
                items.iter().map(|item| self.write_item(&mut out, item, dir_at)).collect();
            let (list_at, list_len) =
                write_key_list(&mut out, "TDirectoryFile", name, &keys, dir_at);
            patch_dir_record(&mut out, record_at, list_at, list_len);
        }
        let (list_at, list_len) = write_key_list(&mut out, "TFile", FILE_NAME, &top_keys, BEGIN);
        patch_dir_record(&mut out, top_dir_at, list_at, list_len);

        let mut header = WBuffer::default();
        header.buf.extend_from_slice(b"root");
        header.u32(62_800);
        header.u32(BEGIN as u32);
        header.u32(out.len() as u32);
        header.u32(0); // fSeekFree
        header.u32(0); // fNbytesFree
        header.u32(0); // nfree
        header.u32(nbytes_name as u32);
        header.u8(4); // fUnits
        header.u32(if self.compress { 101 } else { 0 });
        header.u32(0); // fSeekInfo
        header.u32(0); // fNbytesInfo
        out[..header.buf.len()].copy_from_slice(&header.buf);
        out
    }

    /// Write the file to disk.
    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn write_item(&self, out: &mut Vec<u8>, item: &Item, pdir: usize) -> Vec<u8> {
        let payload = item.encode();
        let stored = if self.compress { zlib_block(&payload) } else { payload.clone() };
        // Equal lengths would read back as uncompressed.
        let stored = if stored.len() == payload.len() { payload.clone() } else { stored };
        let key = encode_key(
            item.class_name(),
            item.name(),
            item.title(),
            payload.len(),
            stored.len(),
            out.len(),
            pdir,
        );
        out.extend_from_slice(&key);
        out.extend(stored);
        key
    }
}

fn split(path: &str) -> (Option<&str>, &str) {
    match path.trim_matches('/').split_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, path.trim_matches('/')),
    }
}

fn tstring(s: &str) -> Vec<u8> {
    let mut w = WBuffer::default();
    w.string(s);
    w.buf
}

fn encode_key(
    class: &str,
    name: &str,
    title: &str,
    obj_len: usize,
    stored_len: usize,
    seek_key: usize,
    seek_pdir: usize,
) -> Vec<u8> {
    let strings = [tstring(class), tstring(name), tstring(title)].concat();
    let key_len = 26 + strings.len();
    let mut w = WBuffer::default();
    w.u32((key_len + stored_len) as u32);
    w.u16(4);
    w.u32(obj_len as u32);
    w.u32(0); // datime
    w.u16(key_len as u16);
    w.u16(1); // cycle
    w.u32(seek_key as u32);
    w.u32(seek_pdir as u32);
    w.buf.extend(strings);
    w.buf
}

/// `TDirectory` streamer with the key list location left at 0.
fn dir_record(seek_dir: u32, seek_parent: u32) -> Vec<u8> {
    let mut w = WBuffer::default();
    w.u16(5);
    w.u32(0); // fDatimeC
    w.u32(0); // fDatimeM
    w.u32(0); // fNbytesKeys
    w.u32(0); // fNbytesName
    w.u32(seek_dir);
    w.u32(seek_parent);
    w.u32(0); // fSeekKeys
    w.buf.extend_from_slice(&[0u8; 18]); // UUID
    w.buf
}

fn patch_dir_record(out: &mut [u8], record_at: usize, seek_keys: usize, nbytes_keys: usize) {
    out[record_at + 10..record_at + 14].copy_from_slice(&(nbytes_keys as u32).to_be_bytes());
    out[record_at + 26..record_at + 30].copy_from_slice(&(seek_keys as u32).to_be_bytes());
}

fn write_key_list(
    out: &mut Vec<u8>,
    class: &str,
    name: &str,
    keys: &[Vec<u8>],
    pdir: usize,
) -> (usize, usize) {
    let at = out.len();
    let mut body = (keys.len() as u32).to_be_bytes().to_vec();
    for k in keys {
        body.extend_from_slice(k);
    }
    let key = encode_key(class, name, "", body.len(), body.len(), at, pdir);
    let len = key.len() + body.len();
    out.extend(key);
    out.extend(body);
    (at, len)
}

#[derive(Default)]
struct WBuffer {
    buf: Vec<u8>,
    classes: HashMap<String, u32>,
}

impl WBuffer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn string(&mut self, s: &str) {
        if s.len() < 255 {
            self.u8(s.len() as u8);
        } else {
            self.u8(255);
            self.u32(s.len() as u32);
        }
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Open a versioned object; close it with [`WBuffer::end`].
    fn begin(&mut self, version: u16) -> usize {
        let at = self.buf.len();
        self.u32(0);
        self.u16(version);
        at
    }

    fn end(&mut self, at: usize) {
        let count = (self.buf.len() - at - 4) as u32;
        self.buf[at..at + 4].copy_from_slice(&(count | BYTE_COUNT_MASK).to_be_bytes());
    }

    fn tobject(&mut self, unique_id: u32) {
        self.u16(1);
        self.u32(unique_id);
        self.u32(TOBJECT_BITS);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        let at = self.begin(1);
        self.tobject(0);
        self.string(name);
        self.string(title);
        self.end(at);
    }

    /// Object written through a pointer, announcing its class on first use.
    fn object(&mut self, class: &str, body: impl FnOnce(&mut Self)) {
        let at = self.buf.len();
        self.u32(0);
        match self.classes.get(class) {
            Some(&tag) => self.u32(CLASS_MASK | tag),
            None => {
                self.classes.insert(class.to_string(), at as u32 + 4);
                self.u32(NEW_CLASS_TAG);
                self.buf.extend_from_slice(class.as_bytes());
                self.u8(0);
            }
        }
        body(self);
        self.end(at);
    }

    fn objstring(&mut self, unique_id: u32, text: &str) {
        let at = self.begin(1);
        self.tobject(unique_id);
        self.string(text);
        self.end(at);
    }

    fn list(&mut self, class: &str, strings: &[(u32, &str)]) {
        self.object(class, |w| {
            let at = w.begin(5);
            w.tobject(0);
            w.string("");
            w.i32(strings.len() as i32);
            for &(id, text) in strings {
                w.object("TObjString", |w| w.objstring(id, text));
                w.u8(0); // option
            }
            w.end(at);
        });
    }

    fn taxis(
        &mut self,
        name: &str,
        title: &str,
        n_bins: usize,
        range: (f64, f64),
        labels: &[String],
    ) {
        let at = self.begin(10);
        self.tnamed(name, title);

        let att = self.begin(4);
        self.i32(510); // fNdivisions
        self.i16(1); // fAxisColor
        self.i16(1); // fLabelColor
        self.i16(42); // fLabelFont
        self.f32(0.005); // fLabelOffset
        self.f32(0.035); // fLabelSize
        self.f32(0.03); // fTickLength
        self.f32(1.0); // fTitleOffset
        self.f32(0.035); // fTitleSize
        self.i16(1); // fTitleColor
        self.i16(42); // fTitleFont
        self.end(att);

        self.i32(n_bins as i32);
        self.f64(range.0);
        self.f64(range.1);
        self.i32(0); // fXbins
        self.i32(0); // fFirst
        self.i32(0); // fLast
        self.u16(0); // fBits2
        self.u8(0); // fTimeDisplay
        self.string(""); // fTimeFormat

        let named: Vec<(u32, &str)> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .map(|(i, l)| (i as u32 + 1, l.as_str()))
            .collect();
        if named.is_empty() {
            self.u32(0);
        } else {
            self.list("THashList", &named);
        }
        self.u32(0); // fModLabs
        self.end(at);
    }

    fn th1(&mut self, h: &FixtureHist) {
        let n = h.contents.len();
        let top = self.begin(3);
        let th1 = self.begin(8);
        self.tnamed(&h.name, &h.title);

        let att = self.begin(2); // TAttLine
        self.i16(602);
        self.i16(1);
        self.i16(1);
        self.end(att);
        let att = self.begin(2); // TAttFill
        self.i16(0);
        self.i16(1001);
        self.end(att);
        let att = self.begin(2); // TAttMarker
        self.i16(1);
        self.i16(1);
        self.f32(1.0);
        self.end(att);

        self.i32(n as i32 + 2);
        self.taxis("xaxis", &h.x_title, n, (h.x_min, h.x_max), &h.labels);
        self.taxis("yaxis", "", 1, (0.0, 1.0), &[]);
        self.taxis("zaxis", "", 1, (0.0, 1.0), &[]);

        self.i16(0); // fBarOffset
        self.i16(1000); // fBarWidth
        self.f64(h.entries);
        let tsumw: f64 = h.contents.iter().sum();
        let tsumw2: f64 = h.sumw2.as_ref().map_or(tsumw, |w| w.iter().sum());
        self.f64(tsumw);
        self.f64(tsumw2);
        self.f64(0.0); // fTsumwx
        self.f64(0.0); // fTsumwx2
        self.f64(-1111.0); // fMaximum
        self.f64(-1111.0); // fMinimum
        self.f64(0.0); // fNormFactor
        self.i32(0); // fContour
        match &h.sumw2 {
            Some(w2) => {
                self.i32(n as i32 + 2);
                self.f64(0.0);
                w2.iter().for_each(|&v| self.f64(v));
                self.f64(0.0);
            }
            None => self.i32(0),
        }
        self.string(""); // fOption
        self.list("TList", &[]); // fFunctions
        self.i32(0); // fBufferSize
        self.u8(0); // fBuffer
        self.i32(1); // fBinStatErrOpt
        self.i32(2); // fStatOverflows
        self.end(th1);

        self.i32(n as i32 + 2);
        let cells = std::iter::once(0.0).chain(h.contents.iter().copied()).chain([0.0]);
        for v in cells {
            match h.storage {
                FixtureStorage::Double => self.f64(v),
                FixtureStorage::Float => self.f32(v as f32),
            }
        }
        self.end(top);
    }
}
