//! Shared SQL predicates for the coverage and spend-row queries.
//!
//! Both queries bind the same parameters in the same positions:
//!
//! | Param | Meaning |
//! |-------|---------|
//! | `$1`  | reporting window start (inclusive) |
//! | `$2`  | reporting window end (exclusive) |
//! | `$3`  | include permanently closed places |
//! | `$4`  | brand filter (substring, case-sensitive) |
//! | `$5`  | brand key: `'id'` or `'name'` |
//!
//! Expanding the predicate from one macro keeps the spend-row count equal to
//! the coverage query's spend count for every filter.

/// Core-registry predicate over alias `c`.
///
/// `strpos` is used instead of `LIKE` so `%` and `_` in a filter match
/// literally. A blank filter matches nothing.
macro_rules! core_scope_predicate {
    () => {
        "($3::BOOLEAN OR c.closed_on IS NULL) \
           AND btrim($4::TEXT) <> '' \
           AND strpos( \
                 CASE WHEN $5::TEXT = 'id' \
                      THEN COALESCE(c.safegraph_brand_ids, '') \
                      ELSE COALESCE(c.brands, '') \
                 END, \
                 $4::TEXT) > 0"
    };
}
