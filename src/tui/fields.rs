use std::cmp::min;

/// A stack of labeled single-line text inputs, one active at a time.
/// Edits are char-indexed so multibyte input stays safe.
pub struct FieldSet {
    fields: Vec<Field>,
    active: usize,
}

struct Field {
    label: &'static str,
    value: String,
    cursor: usize,
}

impl FieldSet {
    pub fn new(labels: &[&'static str]) -> Self {
        let fields = labels
            .iter()
            .map(|label| Field {
                label,
                value: String::new(),
                cursor: 0,
            })
            .collect();
        Self { fields, active: 0 }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn on_last_field(&self) -> bool {
        self.active + 1 == self.fields.len()
    }

    pub fn label(&self, idx: usize) -> &'static str {
        self.fields[idx].label
    }

    pub fn value(&self, idx: usize) -> &str {
        &self.fields[idx].value
    }

    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    /// (active field index, cursor column in chars), for cursor placement.
    pub fn cursor(&self) -> (usize, usize) {
        (self.active, self.fields[self.active].cursor)
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.cursor = 0;
        }
        self.active = 0;
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
        self.clamp_cursor();
    }

    pub fn prev_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        self.clamp_cursor();
    }

    pub fn insert_char(&mut self, ch: char) {
        let field = &mut self.fields[self.active];
        let idx = char_to_byte_index(&field.value, field.cursor);
        field.value.insert(idx, ch);
        field.cursor += 1;
    }

    pub fn backspace(&mut self) {
        let field = &mut self.fields[self.active];
        if field.cursor == 0 {
            return;
        }
        let end = char_to_byte_index(&field.value, field.cursor);
        let start = char_to_byte_index(&field.value, field.cursor - 1);
        field.value.drain(start..end);
        field.cursor -= 1;
    }

    pub fn delete(&mut self) {
        let field = &mut self.fields[self.active];
        if field.cursor >= field.value.chars().count() {
            return;
        }
        let start = char_to_byte_index(&field.value, field.cursor);
        let end = char_to_byte_index(&field.value, field.cursor + 1);
        field.value.drain(start..end);
    }

    pub fn move_left(&mut self) {
        let field = &mut self.fields[self.active];
        field.cursor = field.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let field = &mut self.fields[self.active];
        field.cursor = min(field.cursor + 1, field.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.fields[self.active].cursor = 0;
    }

    pub fn move_end(&mut self) {
        let field = &mut self.fields[self.active];
        field.cursor = field.value.chars().count();
    }

    fn clamp_cursor(&mut self) {
        let field = &mut self.fields[self.active];
        field.cursor = min(field.cursor, field.value.chars().count());
    }
}

fn char_to_byte_index(value: &str, column: usize) -> usize {
    value
        .char_indices()
        .nth(column)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| value.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldSet {
        FieldSet::new(&["Common name", "Scientific name", "Family"])
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut set = fields();
        for ch in "rose".chars() {
            set.insert_char(ch);
        }
        set.next_field();
        for ch in "Rosa".chars() {
            set.insert_char(ch);
        }
        assert_eq!(set.values(), vec!["rose", "Rosa", ""]);
    }

    #[test]
    fn field_navigation_wraps() {
        let mut set = fields();
        set.next_field();
        set.next_field();
        assert!(set.on_last_field());
        set.next_field();
        assert_eq!(set.active(), 0);
        set.prev_field();
        assert_eq!(set.active(), 2);
    }

    #[test]
    fn edits_are_char_safe_for_multibyte_input() {
        let mut set = fields();
        for ch in "Päonie".chars() {
            set.insert_char(ch);
        }
        set.backspace();
        set.backspace();
        assert_eq!(set.value(0), "Päon");

        set.move_left();
        set.move_left();
        set.delete();
        assert_eq!(set.value(0), "Pän");
    }

    #[test]
    fn cursor_movement_stays_in_bounds() {
        let mut set = fields();
        set.move_left();
        assert_eq!(set.cursor(), (0, 0));
        set.insert_char('a');
        set.move_right();
        assert_eq!(set.cursor(), (0, 1));
        set.move_home();
        assert_eq!(set.cursor(), (0, 0));
        set.move_end();
        assert_eq!(set.cursor(), (0, 1));
    }

    #[test]
    fn clear_wipes_values_and_returns_to_the_first_field() {
        let mut set = fields();
        set.insert_char('x');
        set.next_field();
        set.insert_char('y');
        set.clear();
        assert_eq!(set.values(), vec!["", "", ""]);
        assert_eq!(set.cursor(), (0, 0));
    }
}
