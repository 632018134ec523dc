use divan::{Bencher, black_box};
use lingscan::{Document, DocumentReader, handle_document};

fn main() {
    divan::main();
}

const SENTENCE: &str = "# text = Yesterday we saw the most beautiful of the fastest three cars.
1\tYesterday\tyesterday\tNOUN\tNN\t_\t3\tnpadvmod\t_\tEntType=DATE
2\twe\twe\tPRON\tPRP\tCase=Nom|Number=Plur\t3\tnsubj\t_\t_
3\tsaw\tsee\tVERB\tVBD\tTense=Past|VerbForm=Fin\t0\tROOT\t_\t_
4\tthe\tthe\tDET\tDT\t_\t6\tdet\t_\t_
5\tmost\tmost\tADV\tRBS\t_\t6\tadvmod\t_\t_
6\tbeautiful\tbeautiful\tADJ\tJJ\t_\t3\tdobj\t_\t_
7\tof\tof\tADP\tIN\t_\t6\tprep\t_\t_
8\tthe\tthe\tDET\tDT\t_\t11\tdet\t_\t_
9\tfastest\tfast\tADJ\tJJS\t_\t11\tamod\t_\t_
10\tthree\tthree\tNUM\tCD\t_\t11\tnummod\t_\t_
11\tcars\tcar\tNOUN\tNNS\tNumber=Plur\t7\tpobj\t_\tSpaceAfter=No
12\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_

";

fn document(sentences: usize) -> Document {
    let text = SENTENCE.repeat(sentences);
    DocumentReader::from_string(&text).next().unwrap().unwrap()
}

/// Scan a document of 1000 identical sentences
#[divan::bench]
fn scan_document(bencher: Bencher) {
    let doc = document(1000);
    bencher.bench_local(|| black_box(handle_document(black_box(&doc), "bench", false)));
}

/// Same document with parenthesis skipping switched on
#[divan::bench]
fn scan_document_academic(bencher: Bencher) {
    let doc = document(1000);
    bencher.bench_local(|| black_box(handle_document(black_box(&doc), "text_acad", true)));
}
