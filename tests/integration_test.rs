use catalogstats::analysis::{
    additions_per_year, genre_mix_per_year, load_rows_async, movies_vs_tv_per_year, DataSource,
    LoadError,
};
use catalogstats::app::{App, LoadState};
use catalogstats::types::{ContentTypeFilter, Row};
use catalogstats::utils::year_of;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
show_id,type,title,director,date_added,release_year,listed_in
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,\"September 25, 2021\",2020,Documentaries
s2,TV Show,Blood & Water,,\"September 24, 2021\",2021,\"International TV Shows, TV Dramas, TV Mysteries\"
s3,TV Show,Ganglands,Julien Leclercq,\"September 24, 2021\",2021,\"Crime TV Shows, International TV Shows, TV Action & Adventure\"
s4,Movie,Sankofa,Haile Gerima,\" September 24, 2019\",1993,\"Dramas, Independent Movies, International Movies\"
s5,Movie,The Starling,Theodore Melfi,\"January 1, 2018\",2021,\"Comedies, Dramas\"
s6,TV Show,Kota Factory,,,2021,\"International TV Shows, Romantic TV Shows, TV Comedies\"
s7,Movie,My Little Pony,Robert Cullen,\"August 4, 2017\",2021,Children & Family Movies
s8,,Untitled,,\"March 3, 2019\",2019,Dramas

s9,Movie,Jeans,S. Shankar,not a date,1998,\"Comedies, International Movies, Romantic Movies\"
";

fn write_catalog(contents: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("titles.csv");
    fs::write(&path, contents).unwrap();
    let path = path.to_str().unwrap().to_string();
    (temp_dir, path)
}

fn sample_rows() -> Vec<Row> {
    let types = ["Movie", "TV Show", "", "Special"];
    let dates = ["1/1/2018", "June 6, 2019", "", "2020-02-02", "garbage", "Dec 31, 2021"];
    let genres = [
        "Dramas, Comedies",
        "Dramas",
        "",
        "Horror Movies, Thrillers, Dramas",
        "Kids' TV",
        "Comedies, , Stand-Up Comedy",
    ];

    (0..120)
        .map(|i| {
            Row::new(
                types[i % types.len()],
                dates[(i * 7) % dates.len()],
                genres[(i * 5) % genres.len()],
            )
        })
        .collect()
}

#[tokio::test]
async fn test_full_workflow() {
    let (_temp_dir, path) = write_catalog(CATALOG_CSV);

    // Initialize app
    let app = Arc::new(Mutex::new(App::new(path, 2, (640, 360))));

    {
        let mut app = app.lock().unwrap();
        assert_eq!(app.load_state, LoadState::Idle);

        let result = app.load().await;
        app.finish_loading(result);

        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.rows.len(), 9);
        assert_eq!(app.load_report.skipped_records, 0);
        assert!(app.load_report.missing_columns.is_empty());
    }

    // Additions: s6 has no date, s9 has an unparseable one
    {
        let app = app.lock().unwrap();
        let additions: Vec<(i32, usize)> =
            app.additions.iter().map(|c| (c.year, c.titles)).collect();
        assert_eq!(
            additions,
            vec![(2017, 1), (2018, 1), (2019, 2), (2021, 3)]
        );

        let split: Vec<(i32, usize, usize)> = app
            .type_split
            .iter()
            .map(|c| (c.year, c.movie, c.tv_show))
            .collect();
        // s8 has no type but still opens the 2019 bucket
        assert_eq!(
            split,
            vec![(2017, 1, 0), (2018, 1, 0), (2019, 1, 0), (2021, 1, 2)]
        );
    }

    // Content type filter
    {
        let mut app = app.lock().unwrap();
        app.set_content_filter(ContentTypeFilter::TvShow);
        assert_eq!(app.total_titles(), 2);
        app.set_content_filter(ContentTypeFilter::Movie);
        assert_eq!(app.total_titles(), 4);
    }

    // Genre mix with top_k = 2: International TV Shows (3) and Dramas (3)
    {
        let mut app = app.lock().unwrap();
        assert_eq!(
            app.genre_mix.columns,
            vec!["International TV Shows".to_string(), "Dramas".to_string()]
        );

        app.set_min_year(Some(2019));
        let visible = app.visible_genre_mix();
        let years: Vec<i32> = visible.series.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2019, 2021]);

        let y2021 = &visible.series[1];
        assert_eq!(y2021.counts, vec![2, 0]);
        // Documentaries + TV Dramas + TV Mysteries + Crime TV Shows + TV Action & Adventure
        assert_eq!(y2021.other, 5);
    }
}

#[tokio::test]
async fn test_error_handling() {
    // Missing file
    let mut app = App::new("/nonexistent/path/titles.csv".to_string(), 8, (640, 360));
    let result = app.load().await;
    assert!(matches!(result, Err(LoadError::Io { .. })));
    app.finish_loading(result);
    assert_eq!(app.load_state, LoadState::Empty);
    assert!(app.rows.is_empty());
    assert!(app.additions.is_empty());
    assert!(app.error_message.is_some());

    // Header without the expected columns still loads, just with nothing usable
    let (_temp_dir, path) = write_catalog("title,rating\nSome Film,PG\n");
    let parsed = load_rows_async(DataSource::parse(&path)).await.unwrap();
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.report.missing_columns.len(), 3);

    let mut app = App::default();
    app.update_with_rows(parsed);
    assert_eq!(app.load_state, LoadState::Empty);
    assert_eq!(app.error_message, None);
}

#[tokio::test]
async fn test_empty_file_loads_as_empty() {
    let (_temp_dir, path) = write_catalog("type,date_added,listed_in\n");
    let parsed = load_rows_async(DataSource::parse(&path)).await.unwrap();
    assert!(parsed.rows.is_empty());

    let mut app = App::default();
    app.update_with_rows(parsed);
    assert_eq!(app.load_state, LoadState::Empty);
    assert!(app.type_split.is_empty());
    assert!(app.genre_mix.columns.is_empty());
}

#[test]
fn test_additions_sum_matches_filtered_rows() {
    let rows = sample_rows();

    for filter in ContentTypeFilter::ALL {
        let series = additions_per_year(&rows, filter);
        let years: Vec<i32> = series.iter().map(|c| c.year).collect();
        assert!(years.windows(2).all(|w| w[0] < w[1]), "years must be strictly ascending");

        let expected = rows
            .iter()
            .filter(|r| filter.matches(r))
            .filter(|r| year_of(r.date_added.as_deref()).is_some())
            .count();
        assert_eq!(series.iter().map(|c| c.titles).sum::<usize>(), expected);
    }
}

#[test]
fn test_type_split_never_exceeds_rows_per_year() {
    let rows = sample_rows();
    let mut rows_per_year: HashMap<i32, usize> = HashMap::new();
    let mut untyped_years: HashMap<i32, bool> = HashMap::new();
    for row in &rows {
        if let Some(year) = year_of(row.date_added.as_deref()) {
            *rows_per_year.entry(year).or_insert(0) += 1;
            if row.kind().is_none() {
                untyped_years.insert(year, true);
            }
        }
    }

    for bucket in movies_vs_tv_per_year(&rows) {
        let total = rows_per_year[&bucket.year];
        let typed = bucket.movie + bucket.tv_show;
        assert!(typed <= total);
        assert_eq!(typed == total, !untyped_years.contains_key(&bucket.year));
    }
}

#[test]
fn test_genre_mix_conserves_tokens() {
    let rows = sample_rows();
    let distinct: std::collections::HashSet<&str> = rows.iter().flat_map(Row::genres).collect();

    for top_k in [1, 3, 8, 50] {
        let mix = genre_mix_per_year(&rows, top_k);
        assert_eq!(mix.columns.len(), top_k.min(distinct.len()));

        for record in &mix.series {
            let tokens: usize = rows
                .iter()
                .filter(|r| year_of(r.date_added.as_deref()) == Some(record.year))
                .map(|r| r.genres().count())
                .sum();
            assert_eq!(record.total(), tokens);
        }
    }
}

#[test]
fn test_reducers_are_idempotent() {
    let rows = sample_rows();

    let first = serde_json::to_string(&(
        additions_per_year(&rows, ContentTypeFilter::Movie),
        movies_vs_tv_per_year(&rows),
        genre_mix_per_year(&rows, 3),
    ))
    .unwrap();
    let second = serde_json::to_string(&(
        additions_per_year(&rows, ContentTypeFilter::Movie),
        movies_vs_tv_per_year(&rows),
        genre_mix_per_year(&rows, 3),
    ))
    .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_summary_json_shape() {
    let mut app = App::default();
    app.update_with_rows(catalogstats::analysis::ParsedRows {
        rows: vec![
            Row::new("Movie", "1/1/2018", "Dramas, Comedies"),
            Row::new("TV Show", "6/6/2018", "Dramas"),
        ],
        report: Default::default(),
    });

    let value = serde_json::to_value(app.summary()).unwrap();
    assert_eq!(value["additions_per_year"], serde_json::json!([{"year": 2018, "titles": 2}]));
    assert_eq!(
        value["movies_vs_tv_per_year"],
        serde_json::json!([{"year": 2018, "Movie": 1, "TV Show": 1}])
    );
    assert_eq!(
        value["genre_mix_per_year"]["series"],
        serde_json::json!([{"year": 2018, "Dramas": 2, "Comedies": 1, "Other": 0}])
    );
    assert_eq!(value["content_filter"], "All");
}
