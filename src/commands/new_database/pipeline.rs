use super::*;

#[derive(Debug, Clone)]
pub(super) struct EngineOptions {
    pub validity: ValiditySettings,
    pub lookup_batch_size: usize,
    pub classify_names: bool,
}

#[derive(Debug)]
pub(super) struct LoadedTaxonomy {
    pub tree: TaxonTree,
    pub ranks: FinalizedRanks,
    pub names: Vec<Name>,
    pub merges: Vec<Merge>,
    pub counts: LoadCounts,
}

pub(super) fn build_taxonomy<N, M, G>(
    nodes: DumpRows<N>,
    names: DumpRows<M>,
    merged: DumpRows<G>,
    options: &EngineOptions,
) -> Result<LoadedTaxonomy>
where
    N: BufRead,
    M: BufRead,
    G: BufRead,
{
    let raw_taxa = nodes
        .map(|row| -> Result<RawTaxon> { Ok(node_from_row(row?)?) })
        .collect::<Result<Vec<RawTaxon>>>()?;
    info!(taxa = raw_taxa.len(), "read nodes");

    let mut tree = TaxonTree::from_raw(raw_taxa)?;
    let normalized = normalize_ranks(&mut tree)?;
    let unordered_taxa = check_rank_integrity(&tree, &normalized.ranks)?;

    let regex = if options.classify_names {
        Some(unclassified_regex().context("failed to compile unclassified-name regex")?)
    } else {
        None
    };
    let classifier = match &regex {
        Some(regex) => NameClassifier::new(move |name| regex.is_match(name)),
        None => NameClassifier::without_predicate(),
    };

    let names = names
        .map(|row| -> Result<Name> { Ok(classifier.classify(name_from_row(row?)?)) })
        .collect::<Result<Vec<Name>>>()?;
    info!(names = names.len(), "read names");

    let primaries = assert_primary_names(&tree, &names)?;

    let merges = merged
        .map(|row| -> Result<Merge> { Ok(merge_from_row(row?)?) })
        .collect::<Result<Vec<Merge>>>()?;
    let unknown_targets = merges
        .iter()
        .filter(|merge| tree.position_of(&merge.new_tax_id).is_none())
        .count();
    if unknown_targets > 0 {
        warn!(unknown_targets, "merged tax_ids point at taxa missing from nodes");
    }
    info!(merges = merges.len(), "read merged");

    let lookup = ChildIndex::build(&tree, options.lookup_batch_size);
    let validity = propagate_validity(&mut tree, &names, &primaries, &lookup, &options.validity)?;

    let counts = LoadCounts {
        taxa: tree.len(),
        names: names.len(),
        primary_names: names.iter().filter(|name| name.is_primary).count(),
        merges: merges.len(),
        ranks: normalized.ranks.len(),
        reparented_taxa: normalized.reparented,
        synthesized_ranks: normalized.synthesized,
        unordered_taxa,
        anchored_taxa: validity.anchored_taxa,
        overridden_taxa: validity.overridden_taxa,
        valid_taxa: validity.valid_taxa,
        invalid_taxa: validity.invalid_taxa,
    };

    Ok(LoadedTaxonomy {
        tree,
        ranks: normalized.ranks,
        names,
        merges,
        counts,
    })
}
