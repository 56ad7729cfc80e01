use super::bounds::Bound;

const QUADTREE_LEAF_CAPACITY: usize = 16;
const QUADTREE_MAX_DEPTH: usize = 12;

/// A point in (lng, lat) order, tagged with the index of the node it came from.
#[derive(Clone, Copy, Debug)]
pub(super) struct IndexedPoint {
    pub(super) lng: f64,
    pub(super) lat: f64,
    pub(super) index: usize,
}

#[derive(Clone, Copy, Debug)]
struct QuadBounds {
    center_lng: f64,
    center_lat: f64,
    half_extent: f64,
}

impl QuadBounds {
    fn from_points(points: &[IndexedPoint]) -> Option<Self> {
        let mut min_lng = f64::INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;
        let mut max_lat = f64::NEG_INFINITY;

        for point in points {
            min_lng = min_lng.min(point.lng);
            min_lat = min_lat.min(point.lat);
            max_lng = max_lng.max(point.lng);
            max_lat = max_lat.max(point.lat);
        }

        if !min_lng.is_finite()
            || !min_lat.is_finite()
            || !max_lng.is_finite()
            || !max_lat.is_finite()
        {
            return None;
        }

        let span = (max_lng - min_lng).max(max_lat - min_lat).max(1e-9);
        Some(Self {
            center_lng: (min_lng + max_lng) * 0.5,
            center_lat: (min_lat + max_lat) * 0.5,
            half_extent: span * 0.5,
        })
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let (d_lng, d_lat) = match quadrant {
            0 => (-quarter, -quarter),
            1 => (quarter, -quarter),
            2 => (-quarter, quarter),
            _ => (quarter, quarter),
        };

        Self {
            center_lng: self.center_lng + d_lng,
            center_lat: self.center_lat + d_lat,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: &IndexedPoint) -> usize {
        let east = point.lng >= self.center_lng;
        let north = point.lat >= self.center_lat;
        match (east, north) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }
}

/// Tight box around the points under a node. Pruning uses this rather than the
/// cell so rounding in the subdivision can never hide a point.
#[derive(Clone, Copy, Debug)]
struct PointExtent {
    min_lat: f64,
    min_lng: f64,
    max_lat: f64,
    max_lng: f64,
}

impl PointExtent {
    fn of(points: &[IndexedPoint]) -> Self {
        points.iter().fold(
            Self {
                min_lat: f64::INFINITY,
                min_lng: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                max_lng: f64::NEG_INFINITY,
            },
            |extent, point| Self {
                min_lat: extent.min_lat.min(point.lat),
                min_lng: extent.min_lng.min(point.lng),
                max_lat: extent.max_lat.max(point.lat),
                max_lng: extent.max_lng.max(point.lng),
            },
        )
    }

    fn overlaps(self, bound: &Bound) -> bool {
        bound.overlaps(self.min_lat, self.min_lng, self.max_lat, self.max_lng)
    }
}

/// Region quadtree over node positions. Leaves hold the points; interior nodes
/// only route queries.
#[derive(Debug)]
pub(super) struct QuadNode {
    extent: PointExtent,
    points: Vec<IndexedPoint>,
    children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    /// Points must have finite coordinates.
    pub(super) fn build(points: Vec<IndexedPoint>) -> Option<Self> {
        let bounds = QuadBounds::from_points(&points)?;
        Some(Self::build_node(bounds, points, 0))
    }

    fn build_node(bounds: QuadBounds, points: Vec<IndexedPoint>, depth: usize) -> Self {
        let mut node = Self {
            extent: PointExtent::of(&points),
            points,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.points.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for point in &node.points {
            buckets[bounds.quadrant_for(point)].push(*point);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                depth + 1,
            )));
        }
        node.points.clear();
        node
    }

    /// Pushes the index of every point strictly inside `bound`, in no particular
    /// order.
    pub(super) fn query(&self, bound: &Bound, out: &mut Vec<usize>) {
        if !self.extent.overlaps(bound) {
            return;
        }

        for point in &self.points {
            if bound.contains(point.lat, point.lng) {
                out.push(point.index);
            }
        }

        for child in self.children.iter().flatten() {
            child.query(bound, out);
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }
}
