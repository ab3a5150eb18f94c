/// A presentation that shows off what a deck can do. `--new` saves it into the store.
pub const SAMPLE_PRESENTATION: &str = r#"# Welcome to markdslide
<!-- timing: 20 -->

A timed slideshow that runs in your terminal.

* Write your talk as a single markdown file
* Give every slide a time budget
* Finish on time

---
<!-- timing: 30 -->
# Splitting slides

A line that starts with `---` ends the current slide.

Everything between two separators is a slide.

---
<!-- timing: 30 -->
# Timing slides

Put a `<!-- timing: 45 -->` comment on a line of its own anywhere in a slide
to give it 45 seconds.

Slides without one get the default timing, which is 60 seconds unless
configured otherwise.

---
<!-- timing: 40 -->
# Bonus time

When you move forward before a slide's time runs out, the seconds you didn't
use are carried into the next slide.

> Going back to a previous slide discards whatever time was left.

When the time runs out, the next slide is shown automatically. The last slide
just waits for you.

---
<!-- timing: 25 -->
# Keys

| Action   | Keys                         |
| -------- | ---------------------------- |
| Next     | `l` `j` `→` `↓` `space`      |
| Previous | `h` `k` `←` `↑`              |
| Restart  | `r`                          |
| Exit     | `q` `esc` `ctrl+c`           |

---
<!-- timing: 15 -->
# That's it

Edit this file while it's being presented: it's reloaded on save.

Export it with `--export-html` to share it as a web page.
"#;
