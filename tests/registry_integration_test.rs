// tests/registry_integration_test.rs

use recipe_plot::{Figure, HandleRegistry, PlotError, SeriesOptions};

fn line(values: &[f64]) -> SeriesOptions {
    SeriesOptions::y(values.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_first_of_two() {
        let mut fig = Figure::new(1);
        assert_eq!(fig.add_series(line(&[1.0, 2.0]).named("A")).unwrap(), 1);
        assert_eq!(fig.add_series(line(&[2.0, 3.0]).named("B")).unwrap(), 2);

        fig.delete_plot("A").unwrap();

        assert_eq!(fig.plot_index("B").unwrap(), 1);
        assert_eq!(fig.handles().name_of(1).unwrap(), "B");
        assert!(matches!(fig.plot_index("A"), Err(PlotError::NotFound(_))));
    }

    #[test]
    fn test_delete_by_index_shifts_later_entries() {
        let mut fig = Figure::new(1);
        for name in ["a", "b", "c", "d", "e"] {
            fig.add_series(line(&[0.0, 1.0]).named(name)).unwrap();
        }
        fig.delete_plot(3usize).unwrap();

        let order: Vec<(usize, String)> = fig
            .handles()
            .iter()
            .map(|(i, name, _)| (i, name.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "a".to_string()),
                (2, "b".to_string()),
                (3, "d".to_string()),
                (4, "e".to_string()),
            ]
        );
    }

    #[test]
    fn test_auto_names_skip_taken_numbers() {
        let mut fig = Figure::new(1);
        fig.add_series(line(&[1.0, 2.0]).named("2")).unwrap();
        // The count-based name "2" is taken, so the automatic name moves on to "3".
        let idx = fig.add_series(line(&[1.0, 2.0])).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(fig.handles().name_of(2).unwrap(), "3");
        let names: Vec<&str> = fig.handles().names().collect();
        assert_eq!(names, vec!["2", "3"]);
    }

    #[test]
    fn test_out_of_range_indices() {
        let mut reg: HandleRegistry<&str> = HandleRegistry::new();
        reg.add("x", "first").unwrap();
        assert!(matches!(reg.get(0usize), Err(PlotError::NotFound(_))));
        assert!(matches!(reg.get(2usize), Err(PlotError::NotFound(_))));
        assert!(matches!(reg.delete("second"), Err(PlotError::NotFound(_))));
        assert_eq!(*reg.get(1usize).unwrap(), "x");
    }
}

// tests/registry_integration_test.rs
