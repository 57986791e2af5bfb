/// Greedy per-line fill, the shape the summary is printed and saved in.
///
/// Each input line is wrapped independently so paragraph breaks survive;
/// blank lines pass through, and a word longer than `width` stays intact on
/// its own line. `width` of 0 disables wrapping.
pub fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
            } else if current.len() + 1 + word.len() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                out.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        out.push(current);
    }

    out.join("\n")
}
