#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use marklink_html::{AppSettings, Metas, PostProcessor};

const URL_PREFIX: &str = "http://localhost:3000/gogits/gogs/";

const HTML_PLAIN: &str = r"<h1>Release notes</h1>
<p>Nothing to link in here, only prose about the release and what changed.</p>
<ul>
<li>Faster startup</li>
<li>Smaller binaries</li>
</ul>";

const HTML_COMMENT: &str = r#"<p>Thanks @alice and @bob.smith! This fixes #1287 and gogits/gogs#42.</p>
<p>Introduced in d8a994ef243349f321568f9e36d5c3f444b99cae, see
http://localhost:3000/gogits/gogs/issues/786 and https://example.com/docs for background.</p>
<pre><code>#123 @not-a-mention</code></pre>
<p>Questions go to someone@example.com.</p>"#;

const HTML_WIKI: &str = r#"<p>Wiki! Enjoy :)</p>
<ul>
<li>[[Links, Language bindings, Engine bindings|Links]]</li>
<li>[[Tips]]</li>
<li>[[Memory Editor|memory_editor_example]]</li>
</ul>
<table>
<tr><th>[[images/icon-install.png]]</th><th>[[Installation]]</th></tr>
<tr><td>[[images/icon-usage.png]]</td><td>[[Usage]]</td></tr>
</table>
<p><a href="/x">see [[Tips]]</a></p>"#;

fn bench_post_process(c: &mut Criterion) {
  let mut group = c.benchmark_group("post_process");
  let processor =
    PostProcessor::new(AppSettings::new("http://localhost:3000/")).unwrap();
  let metas = Metas::new();

  for (name, html, is_wiki) in [
    ("plain", HTML_PLAIN, false),
    ("comment", HTML_COMMENT, false),
    ("wiki", HTML_WIKI, true),
  ] {
    group.bench_with_input(BenchmarkId::new("default", name), &html, |b, html| {
      b.iter(|| {
        processor
          .post_process(
            black_box(html.as_bytes()),
            black_box(URL_PREFIX),
            black_box(&metas),
            is_wiki,
          )
          .unwrap()
      });
    });
  }

  group.finish();
}

fn bench_commit_message(c: &mut Criterion) {
  let mut group = c.benchmark_group("commit_message");
  let processor =
    PostProcessor::new(AppSettings::new("http://localhost:3000/")).unwrap();
  let metas = Metas::new();
  let message = "Fix #12: crash when @alice pushes d8a994ef24 to the mirror";

  for default_link in ["", "http://localhost:3000/gogits/gogs/commit/d8a994ef24"]
  {
    let id = if default_link.is_empty() {
      "no_default_link"
    } else {
      "default_link"
    };
    group.bench_with_input(BenchmarkId::new(id, "title"), &message, |b, msg| {
      b.iter(|| {
        processor
          .render_commit_message(
            black_box(msg.as_bytes()),
            black_box("/gogits/gogs"),
            black_box(default_link),
            black_box(&metas),
          )
          .unwrap()
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_post_process, bench_commit_message);
criterion_main!(benches);
