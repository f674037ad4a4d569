/// A 2D tile grid stored row-major. Dungeon maps have hard edges, so unlike a
/// world map nothing wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.in_bounds(x, y), "({}, {}) outside {}x{}", x, y, self.width, self.height);
        y * self.width + x
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// One slice per row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() panics on 0; an empty map simply has no rows
        self.data.chunks(self.width.max(1))
    }

    /// Copy out as nested rows (`grid[y][x]`), the layout tilemap renderers take.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl<T: PartialEq> Tilemap<T> {
    /// Number of cells matching a predicate
    pub fn count_where(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }
}
