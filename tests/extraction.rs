use std::fs;
use std::path::PathBuf;

use contextwords::batch::BatchExtractor;
use contextwords::output::{OutputFormat, SlotWriter};
use contextwords::processing::{FileFilter, FileProcessor};
use contextwords::types::{Encoding, ExtractionConfig, OccurrenceId, Side};
use contextwords::window::{find_occurrences, WindowExtractor};
use pretty_assertions::assert_eq;

const NEWS: &str = "<text id=\"news\">
<s>
the\tDT\tthe\t1\t2\tdet
cat\tNN\tcat\t2\t3\tnsubj
eats\tVBZ\teat\t3\t0\tROOT
fresh\tJJ\tfresh\t4\t5\tamod
fish\tNN\tfish\t5\t3\tdobj
</s>
</text>
";

const BLOG: &str = "<s>
dogs\tNNS\tdog\t1\t2\tnsubj
eat\tVBP\teat\t2\t0\tROOT
bones\tNNS\tbone\t3\t2\tdobj
</s>
";

fn corpus_dir() -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("news.conll"), NEWS).unwrap();
    fs::write(dir.path().join("blog.conll"), BLOG).unwrap();
    fs::write(dir.path().join("README.md"), "not a corpus").unwrap();
    let files = FileFilter::default().collect(&[dir.path().to_path_buf()]);
    (dir, files)
}

fn config() -> ExtractionConfig {
    let mut config = ExtractionConfig::default()
        .with_spans(2, 2)
        .with_dependency_mode(true);
    config.encoding = Encoding::Utf8;
    config
}

fn discover(extractor: &WindowExtractor, files: &[PathBuf]) -> Vec<OccurrenceId> {
    let processor = FileProcessor::new(extractor.config().encoding);
    files
        .iter()
        .flat_map(|path| {
            let file = processor.load(path).unwrap();
            find_occurrences(extractor.matcher().as_ref(), "eat/V", &file)
        })
        .collect()
}

#[test]
fn test_discover_and_extract_across_files() {
    let (_dir, files) = corpus_dir();
    assert_eq!(files.len(), 2);

    let extractor = WindowExtractor::from_config(config()).unwrap();
    let occurrences = discover(&extractor, &files);
    let ids: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["eat/V/blog/3", "eat/V/news/5"]);

    let (slots, report) = BatchExtractor::new(extractor)
        .extract("eat/V", &occurrences, &files)
        .unwrap();

    assert_eq!(report.total_occurrences, 2);
    assert_eq!(report.processed_occurrences, 2);
    assert!(report.errors.is_empty());
    assert_eq!(slots.len(), 10);

    let news: Vec<_> = slots.iter().filter(|s| s.token_id == "eat/V/news/5").collect();
    let target = news.iter().find(|s| s.side == Side::Target).unwrap();
    assert_eq!(target.dependency.as_ref().unwrap().path, "#T");

    let fish = news.iter().find(|s| s.position == "R1").unwrap();
    assert_eq!(fish.cw.as_deref(), Some("fish/N"));
    let data = fish.dependency.as_ref().unwrap();
    assert_eq!(data.steps, 1);
    assert_eq!(data.path, "#T->dobj:fish");
    assert_eq!(data.rep_path, "#T->dobj:Cw");

    let blog: Vec<_> = slots.iter().filter(|s| s.token_id == "eat/V/blog/3").collect();
    let opener = blog.iter().find(|s| s.position == "L1").unwrap();
    assert_eq!(opener.cw, None);
    assert!(!opener.same_sentence);
    assert!(opener.dependency.is_none());
}

#[tokio::test]
async fn test_concurrent_extraction_with_failures() {
    let (dir, mut files) = corpus_dir();
    files.push(dir.path().join("missing.conll"));

    let occurrences: Vec<OccurrenceId> = [
        "eat/V/news/5",
        "eat/V/missing/1",
        "eat/V/nowhere/2",
        "eat/V/blog/40",
        "eat/V/blog/3",
    ]
    .iter()
    .map(|s| s.parse().unwrap())
    .collect();

    let extractor = WindowExtractor::from_config(config()).unwrap();
    let (slots, report) = BatchExtractor::new(extractor)
        .extract_concurrent("eat/V", &occurrences, &files)
        .await
        .unwrap();

    assert_eq!(report.total_occurrences, 5);
    assert_eq!(report.processed_occurrences, 2);
    assert_eq!(report.unresolved_occurrences, 1);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.failed_occurrences, 2);
    assert_eq!(report.errors.len(), 3);

    // input order is kept across files
    assert_eq!(slots.first().unwrap().token_id, "eat/V/news/5");
    assert_eq!(slots.last().unwrap().token_id, "eat/V/blog/3");
}

#[test]
fn test_tsv_output_rows() {
    let (_dir, files) = corpus_dir();
    let extractor = WindowExtractor::from_config(config().with_spans(1, 1)).unwrap();
    let columns = extractor.matcher().columns().to_vec();
    let occurrences = vec!["eat/V/blog/3".parse().unwrap()];

    let (slots, _) = BatchExtractor::new(extractor)
        .extract("eat/V", &occurrences, &files)
        .unwrap();

    let mut writer = SlotWriter::new(Vec::new(), OutputFormat::Tsv, columns);
    assert_eq!(writer.write_all(&slots).unwrap(), 3);
    let out = String::from_utf8(writer.finish().unwrap()).unwrap();

    let rows: Vec<&str> = out.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("target_lemma\ttoken_id\t"));
    assert_eq!(
        rows[1],
        "eat/V\teat/V/blog/3\t1\tL\tL0\tdog/N\ttrue\t1\t#T->nsubj:dog\t#T->nsubj:Cw\tdogs\tN\tdog\t1\t2\tnsubj"
    );
}
